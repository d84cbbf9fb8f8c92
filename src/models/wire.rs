//! Payloads exchanged with the label backend.
//!
//! - `GET /config` → [`EnumerationSet`]
//! - `GET /status` → [`StatusReport`]
//! - `PUT /print` with a [`JobRequest`] body
//! - `PUT /preview?max_width=<int>` with a [`JobRequest`] body → [`PreviewResponse`]

use super::variant::Variant;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Option lists fetched once at startup.
///
/// Only used to populate selectable options; configuration values are never
/// validated against it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationSet {
    #[serde(default)]
    pub tapes: Vec<String>,
    #[serde(default)]
    pub printers: Vec<String>,
    #[serde(default)]
    pub fonts: Vec<String>,
    #[serde(default)]
    pub dictionaries: Vec<String>,
}

/// Readiness and loaded media of one printer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterStatus {
    pub media: String,
    pub ready: bool,
}

/// `/status` response: printer identifier → status, in backend order.
pub type StatusReport = IndexMap<String, PrinterStatus>;

/// Wire payload for both preview and print.
///
/// Built fresh for every call. The label object keeps insertion order so
/// `label_type` comes first, followed by the variant's fields in table order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    pub label: IndexMap<String, Value>,
    pub count: u32,
}

impl JobRequest {
    /// Start a request for `variant` with `count = 1`.
    pub fn new(variant: Variant) -> Self {
        let mut label = IndexMap::new();
        label.insert("label_type".to_string(), Value::from(variant.as_str()));
        Self { label, count: 1 }
    }

    pub fn label_type(&self) -> Option<&str> {
        self.label.get("label_type").and_then(Value::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.label.get(key)
    }

    /// Keys of the label object, `label_type` included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.label.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Physical dimension in inches.
///
/// The backend reports these either as numbers or as preformatted strings
/// such as `"1.0"`; both are shown verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Number(n) => write!(f, "{}", n),
            Dimension::Text(s) => f.write_str(s),
        }
    }
}

/// `/preview` response: label size and the rendered bitmap as base64 PNG.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub height: Dimension,
    pub width: Dimension,
    pub preview: String,
}
