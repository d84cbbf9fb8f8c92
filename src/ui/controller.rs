// GUI Controller - Binds the Slint window to a LabelSession
//
// - Slint callbacks → state edits, then async preview/print work on tokio
// - StateManager events → property updates through the EventLoopBridge
// - Preview PNGs are decoded off the UI thread

use crate::models::{ALIGNMENTS, AppState, Field, FieldVisibility, Preview, SIZES, Variant};
use crate::services::{LabelBackend, LabelSession};
use crate::state::{StateChange, StateManager};
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use anyhow::{Context, Result};
use slint::{ComponentHandle, Image, ModelRc, Rgba8Pixel, SharedPixelBuffer, SharedString, VecModel};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires the Slint window to a [`LabelSession`]
///
/// # Example
/// ```ignore
/// let session = LabelSession::new(state, Arc::new(HttpBackend::new(url)), metrics);
/// runtime.block_on(session.start(Variant::Text));
///
/// let controller = GuiController::new(session, runtime.handle().clone())?;
/// controller.run()?;  // Blocks until window is closed
/// ```
pub struct GuiController<B: LabelBackend + 'static> {
    ui: MainWindow,
    _bridge: EventLoopBridge<MainWindow>,
    session: LabelSession<B>,
}

impl<B: LabelBackend + 'static> GuiController<B> {
    pub fn new(session: LabelSession<B>, tokio_handle: tokio::runtime::Handle) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;

        let bridge = EventLoopBridge::new(&ui, tokio_handle, Arc::clone(session.metrics()));

        Self::sync_ui_with_state(&ui, &session.state().snapshot());
        Self::setup_callbacks(&ui, &bridge, &session);
        Self::setup_state_subscription(&bridge, session.state());

        tracing::info!("GUI controller initialized");

        Ok(Self {
            ui,
            _bridge: bridge,
            session,
        })
    }

    /// Run the GUI (blocks until window is closed)
    pub fn run(self) -> Result<(), slint::PlatformError> {
        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();
        tracing::info!(
            "GUI closed on variant '{}'",
            self.session.state().read(|s| s.active_variant())
        );
        result
    }

    /// Push the whole state into the window once at startup.
    fn sync_ui_with_state(ui: &MainWindow, state: &AppState) {
        ui.set_active_variant(state.active_variant().as_str().into());
        Self::apply_visibility(ui, &state.visibility());

        ui.set_printers(string_model(&state.enumerations.printers));
        ui.set_tapes(string_model(&state.enumerations.tapes));
        ui.set_fonts(string_model(&state.enumerations.fonts));
        ui.set_dictionaries(string_model(&state.enumerations.dictionaries));
        ui.set_sizes(str_model(&SIZES));
        ui.set_alignments(str_model(&ALIGNMENTS));

        for field in Field::ALL {
            Self::apply_field(ui, field, state.label.values.get(field));
        }

        ui.set_printer_ready(state.printer_ready);
        ui.set_banner_text(state.banner.message.clone().into());
        ui.set_banner_danger(state.banner.is_danger());

        if let Some(preview) = &state.preview {
            ui.set_preview_caption(preview.caption.clone().into());
            match decode_preview(preview) {
                Ok(buffer) => ui.set_preview_image(Image::from_rgba8(buffer)),
                Err(e) => tracing::warn!("Failed to decode preview: {:#}", e),
            }
        }
    }

    fn apply_visibility(ui: &MainWindow, visibility: &FieldVisibility) {
        ui.set_show_lines(visibility.lines);
        ui.set_show_label(visibility.label);
        ui.set_show_qrtext(visibility.qrtext);
        ui.set_show_length(visibility.length);
        ui.set_show_id(visibility.id);
        ui.set_show_dictionary(visibility.dictionary);
    }

    fn apply_field(ui: &MainWindow, field: Field, value: &str) {
        let value = SharedString::from(value);
        match field {
            Field::Printer => ui.set_printer_value(value),
            Field::Tape => ui.set_tape_value(value),
            Field::Fontname => ui.set_fontname_value(value),
            Field::Size => ui.set_size_value(value),
            Field::Align => ui.set_align_value(value),
            Field::Lines => ui.set_lines_value(value),
            Field::Label => ui.set_label_value(value),
            Field::Qrtext => ui.set_qrtext_value(value),
            Field::Length => ui.set_length_value(value),
            Field::Id => ui.set_id_value(value),
            Field::Dictionary => ui.set_dictionary_value(value),
        }
    }

    /// Store the width the layout currently gives the preview image.
    fn capture_preview_width(ui_weak: &slint::Weak<MainWindow>, state: &StateManager) {
        if let Some(ui) = ui_weak.upgrade() {
            if let Some(width) = layout_width_px(ui.get_preview_width()) {
                state.set_preview_width(width);
            }
        }
    }

    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        session: &LabelSession<B>,
    ) {
        // Navigation
        let bridge_handle = bridge.clone_handle();
        let session_clone = session.clone();
        let ui_weak = ui.as_weak();
        ui.on_variant_selected(move |key| {
            let variant = match key.parse::<Variant>() {
                Ok(variant) => variant,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return;
                }
            };

            tracing::info!("Variant selected: {}", variant);
            Self::capture_preview_width(&ui_weak, session_clone.state());
            session_clone.state().set_variant(variant);

            let session = session_clone.clone();
            bridge_handle.spawn_async(move || async move { session.refresh_preview().await });
        });

        // Every bound input: the edit lands in state before the preview is
        // requested, so the request reads the new value
        let bridge_handle = bridge.clone_handle();
        let session_clone = session.clone();
        let ui_weak = ui.as_weak();
        ui.on_field_edited(move |key, value| {
            let field = match key.parse::<Field>() {
                Ok(field) => field,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return;
                }
            };

            Self::capture_preview_width(&ui_weak, session_clone.state());
            session_clone.state().set_field(field, value.to_string());

            let session = session_clone.clone();
            bridge_handle.spawn_async(move || async move { session.refresh_preview().await });
        });

        let bridge_handle = bridge.clone_handle();
        let session_clone = session.clone();
        let ui_weak = ui.as_weak();
        ui.on_refresh_clicked(move || {
            tracing::debug!("Refresh clicked");
            Self::capture_preview_width(&ui_weak, session_clone.state());

            let session = session_clone.clone();
            bridge_handle.spawn_async(move || async move { session.refresh_preview().await });
        });

        let bridge_handle = bridge.clone_handle();
        let session_clone = session.clone();
        ui.on_print_clicked(move || {
            tracing::info!("Print clicked");
            let session = session_clone.clone();
            bridge_handle.spawn_async(move || async move { session.submit_print().await });
        });

        tracing::debug!("UI callbacks configured");
    }

    /// Forward state change events to the window.
    ///
    /// Runs on its own thread; property writes are marshalled through the
    /// bridge since Slint types are not `Send`.
    fn setup_state_subscription(bridge: &EventLoopBridge<MainWindow>, state: &Arc<StateManager>) {
        let bridge_handle = bridge.clone_handle();
        let state_manager = Arc::clone(state);
        let mut rx = state.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => {
                        tracing::trace!("State change received: {:?}", change);
                        Self::forward_change(&bridge_handle, &state_manager, change);
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("State channel closed - stopping subscription thread");
                        break;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("State subscription lagged, {} events skipped", skipped);
                        let snapshot = state_manager.snapshot();
                        bridge_handle.update_ui(move |ui| Self::sync_ui_with_state(ui, &snapshot));
                    }
                }
            }
        });
    }

    fn forward_change(
        bridge: &EventLoopBridgeHandle<MainWindow>,
        state_manager: &Arc<StateManager>,
        change: StateChange,
    ) {
        match change {
            StateChange::VariantChanged {
                variant,
                visibility,
            } => {
                bridge.update_ui(move |ui| {
                    ui.set_active_variant(variant.as_str().into());
                    Self::apply_visibility(ui, &visibility);
                });
            }

            StateChange::FieldChanged { field, .. } => {
                // Read the value when the update runs, not when it was queued;
                // the operator may have typed further in between
                let state = Arc::clone(state_manager);
                bridge.update_ui(move |ui| {
                    let value = state.read(|s| s.label.values.get(field).to_string());
                    Self::apply_field(ui, field, &value);
                });
            }

            StateChange::EnumerationsLoaded { enumerations } => {
                bridge.update_ui(move |ui| {
                    ui.set_printers(string_model(&enumerations.printers));
                    ui.set_tapes(string_model(&enumerations.tapes));
                    ui.set_fonts(string_model(&enumerations.fonts));
                    ui.set_dictionaries(string_model(&enumerations.dictionaries));
                });
            }

            StateChange::ReadinessChanged { ready } => {
                bridge.update_ui(move |ui| ui.set_printer_ready(ready));
            }

            StateChange::BannerChanged { banner } => {
                bridge.update_ui(move |ui| {
                    ui.set_banner_text(banner.message.as_str().into());
                    ui.set_banner_danger(banner.is_danger());
                });
            }

            StateChange::PreviewUpdated { preview } => match decode_preview(&preview) {
                Ok(buffer) => {
                    bridge.update_ui(move |ui| {
                        ui.set_preview_image(Image::from_rgba8(buffer));
                        ui.set_preview_caption(preview.caption.as_str().into());
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to decode preview: {:#}", e);
                    bridge.update_ui(move |ui| {
                        ui.set_preview_caption(preview.caption.as_str().into());
                    });
                }
            },
        }
    }
}

fn string_model(items: &[String]) -> ModelRc<SharedString> {
    let items: Vec<SharedString> = items.iter().map(|s| SharedString::from(s.as_str())).collect();
    ModelRc::new(VecModel::from(items))
}

fn str_model(items: &[&str]) -> ModelRc<SharedString> {
    let items: Vec<SharedString> = items.iter().copied().map(SharedString::from).collect();
    ModelRc::new(VecModel::from(items))
}

/// Whole pixels available for the preview; fractions are truncated.
/// `None` before the layout has been measured.
pub fn layout_width_px(width: f32) -> Option<u32> {
    let width = width.trunc();
    (width >= 1.0).then_some(width as u32)
}

/// Decode the base64 PNG of a preview into an RGBA pixel buffer.
pub fn decode_preview(preview: &Preview) -> Result<SharedPixelBuffer<Rgba8Pixel>> {
    let bytes = preview
        .png_bytes()
        .context("Preview is not valid base64")?;
    let rgba = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
        .context("Preview is not a valid PNG")?
        .to_rgba8();

    Ok(SharedPixelBuffer::<Rgba8Pixel>::clone_from_slice(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_preview(width: u32, height: u32) -> Preview {
        let img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        Preview {
            caption: "0.5 in X 1.2 in".to_string(),
            png_base64: STANDARD.encode(&bytes),
        }
    }

    #[test]
    fn test_decode_preview_dimensions() {
        let buffer = decode_preview(&png_preview(4, 2)).unwrap();

        assert_eq!(buffer.width(), 4);
        assert_eq!(buffer.height(), 2);
        assert_eq!(buffer.as_slice()[0], Rgba8Pixel::new(0, 0, 0, 255));
    }

    #[test]
    fn test_layout_width_truncates() {
        assert_eq!(layout_width_px(412.6), Some(412));
        assert_eq!(layout_width_px(600.0), Some(600));
        assert_eq!(layout_width_px(0.9), None);
        assert_eq!(layout_width_px(0.0), None);
    }

    #[test]
    fn test_decode_preview_rejects_garbage() {
        let preview = Preview {
            caption: String::new(),
            png_base64: "not base64!".to_string(),
        };
        assert!(decode_preview(&preview).is_err());

        let preview = Preview {
            caption: String::new(),
            png_base64: STANDARD.encode(b"plain text"),
        };
        assert!(decode_preview(&preview).is_err());
    }
}
