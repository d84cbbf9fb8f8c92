//! Data models for the label panel.
//!
//! - [`Variant`], [`FieldGroup`], [`FieldVisibility`], [`Field`]: the closed set of label
//!   kinds and the inputs they read
//! - [`LabelConfiguration`]: active variant plus the raw value of every bound input
//! - [`EnumerationSet`], [`PrinterStatus`], [`JobRequest`], [`PreviewResponse`]: backend payloads
//! - [`AppState`]: the central state container, owned by [`StateManager`](crate::state::StateManager)
//! - [`ClientConfig`]: client settings loaded by [`ConfigManager`](crate::config::ConfigManager)

pub mod app_state;
pub mod config;
pub mod label;
pub mod variant;
pub mod wire;

pub use app_state::{AppState, Banner, BannerKind, NOT_READY_MESSAGE, Preview};
pub use config::ClientConfig;
pub use label::{ALIGNMENTS, FieldValues, LabelConfiguration, SIZES};
pub use variant::{Field, FieldGroup, FieldParseError, FieldVisibility, Variant, VariantParseError};
pub use wire::{Dimension, EnumerationSet, JobRequest, PreviewResponse, PrinterStatus, StatusReport};
