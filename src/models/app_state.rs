use super::label::LabelConfiguration;
use super::variant::{FieldVisibility, Variant};
use super::wire::{EnumerationSet, PreviewResponse};
use crate::services::registry;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Fixed banner text for a printer that reports itself not ready.
pub const NOT_READY_MESSAGE: &str = "Printer not ready";

/// Styling of the single banner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BannerKind {
    #[default]
    Success,
    Danger,
}

/// The one status/warning display. Newer outcomes overwrite older ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Danger,
            message: message.into(),
        }
    }

    /// Danger banner carrying backend-provided detail text.
    pub fn failure(detail: impl std::fmt::Display) -> Self {
        Self::danger(format!("Failure: {}", detail))
    }

    pub fn is_danger(&self) -> bool {
        self.kind == BannerKind::Danger
    }
}

/// Last rendered preview: caption plus the bitmap as base64 PNG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preview {
    pub caption: String,
    pub png_base64: String,
}

impl Preview {
    pub fn from_response(response: &PreviewResponse) -> Self {
        Self {
            caption: format!("{} in X {} in", response.height, response.width),
            png_base64: response.preview.clone(),
        }
    }

    /// Displayable image source with the bitmap embedded.
    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.png_base64)
    }

    pub fn png_bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.png_base64.as_bytes())
    }
}

/// Single source of truth for the session.
///
/// Wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`];
/// mutate only through [`update()`](crate::state::StateManager::update) so
/// change events are emitted.
#[derive(Clone, Debug)]
pub struct AppState {
    // Operator-controlled configuration
    pub label: LabelConfiguration,

    // Backend-supplied option lists
    pub enumerations: EnumerationSet,

    // Readiness of the selected printer as of the last poll
    pub printer_ready: bool,

    // Display outputs
    pub banner: Banner,
    pub preview: Option<Preview>,

    // Preview width available in the current layout, in pixels
    pub preview_width: u32,

    // Token of the most recently issued preview request
    pub preview_token: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            label: LabelConfiguration::default(),
            enumerations: EnumerationSet::default(),
            printer_ready: false,
            banner: Banner::default(),
            preview: None,
            preview_width: 600,
            preview_token: 0,
        }
    }
}

impl AppState {
    pub fn active_variant(&self) -> Variant {
        self.label.active_variant
    }

    /// Field-group visibility for the active variant.
    pub fn visibility(&self) -> FieldVisibility {
        registry::visibility_for(self.label.active_variant)
    }

    /// Navigation indicator states; exactly one entry is `true`.
    pub fn nav_indicators(&self) -> [(Variant, bool); 5] {
        Variant::ALL.map(|v| (v, v == self.label.active_variant))
    }

    /// Issue a new preview token. Responses carrying an older token are stale.
    pub fn next_preview_token(&mut self) -> u64 {
        self.preview_token += 1;
        self.preview_token
    }

    pub fn is_latest_preview(&self, token: u64) -> bool {
        token == self.preview_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::wire::Dimension;

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert_eq!(state.active_variant(), Variant::Text);
        assert!(!state.printer_ready);
        assert!(state.preview.is_none());
        assert_eq!(state.banner, Banner::default());
    }

    #[test]
    fn test_exactly_one_nav_indicator_active() {
        let mut state = AppState::default();
        for variant in Variant::ALL {
            state.label.active_variant = variant;
            let active: Vec<_> = state
                .nav_indicators()
                .into_iter()
                .filter(|(_, on)| *on)
                .map(|(v, _)| v)
                .collect();
            assert_eq!(active, vec![variant]);
        }
    }

    #[test]
    fn test_preview_tokens_are_monotonic() {
        let mut state = AppState::default();
        let first = state.next_preview_token();
        let second = state.next_preview_token();
        assert!(second > first);
        assert!(!state.is_latest_preview(first));
        assert!(state.is_latest_preview(second));
    }

    #[test]
    fn test_failure_banner_text() {
        let banner = Banner::failure("Empty lines not allowed");
        assert!(banner.is_danger());
        assert_eq!(banner.message, "Failure: Empty lines not allowed");
    }

    #[test]
    fn test_preview_from_response() {
        let response = PreviewResponse {
            height: Dimension::Text("0.5".to_string()),
            width: Dimension::Number(2.25),
            preview: "iVBORw0KGgo=".to_string(),
        };
        let preview = Preview::from_response(&response);

        assert_eq!(preview.caption, "0.5 in X 2.25 in");
        assert_eq!(preview.data_uri(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(
            preview.png_bytes().unwrap(),
            vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]
        );
    }
}
