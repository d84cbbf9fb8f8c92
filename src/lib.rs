// Label Panel - client-side control surface for a label printer backend
//
// This is the library crate containing the core logic and data structures.
// The binary crate (main.rs) provides the GUI and the headless subcommands.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use metrics::Metrics;
pub use models::{
    AppState, Banner, ClientConfig, EnumerationSet, Field, JobRequest, LabelConfiguration,
    Variant,
};
pub use services::{BackendError, HttpBackend, LabelBackend, LabelSession, build_request};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
