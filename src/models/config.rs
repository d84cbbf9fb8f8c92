use super::variant::Variant;
use serde::{Deserialize, Serialize};

/// Client settings from `labelpanel.yaml`, overridable by `LABELPANEL_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the label backend
    pub backend_url: String,

    /// Log at debug level instead of info
    pub debug_mode: bool,

    /// Directory for rotating log files
    pub log_dir: String,

    /// Drop preview responses that arrive after a newer request was issued
    pub discard_stale_previews: bool,

    /// Preview width hint used before the window reports its layout
    pub default_preview_width: u32,

    /// Variant selected at startup
    pub default_variant: Variant,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            debug_mode: false,
            log_dir: "logs".to_string(),
            discard_stale_previews: true,
            default_preview_width: 600,
            default_variant: Variant::Text,
        }
    }
}
