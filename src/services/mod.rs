//! Services module - the label panel's core logic.
//!
//! Everything here is framework-agnostic: no Slint, no widgets. The GUI and
//! the headless CLI drive the same code.
//!
//! # Components
//!
//! - [`registry`]: which field-groups each [`Variant`](crate::models::Variant) shows
//!   ([`visibility_for`]) and which fields its request reads ([`fields_for`])
//! - [`request`]: [`build_request`] turns the live configuration into a
//!   [`JobRequest`](crate::models::JobRequest), applying the length scaling and
//!   line splitting
//! - [`backend`]: the [`LabelBackend`] trait over the four backend endpoints and
//!   its reqwest implementation [`HttpBackend`]
//! - [`session`]: [`LabelSession`] coordinates enumeration loading, status
//!   polling, preview refresh and print submission against the shared state
//!
//! # Usage Example
//!
//! ```ignore
//! use labelpanel::services::{HttpBackend, LabelSession};
//!
//! let session = LabelSession::new(state, Arc::new(HttpBackend::new(url)), metrics);
//! session.start(Variant::Text).await;      // /config, then first preview
//! session.select_variant(Variant::Qr).await;
//! session.submit_print().await;
//! ```

pub mod backend;
pub mod registry;
pub mod request;
pub mod session;

pub use backend::{BackendError, BackendResult, HttpBackend, LabelBackend};
pub use registry::{fields_for, visibility_for};
pub use request::{LENGTH_UNIT, build_request};
pub use session::{LabelSession, OK_MESSAGE, PRINTED_MESSAGE, PRINTING_MESSAGE};
