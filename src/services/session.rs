//! Label session: the operations behind every control on the panel.
//!
//! All operations read the live configuration from [`StateManager`] at the
//! moment they build a request and report their outcome through the single
//! banner. None of them return errors; the `try_*` variants exist for
//! headless callers that need the outcome as a value.

use super::backend::{BackendResult, LabelBackend};
use super::request::build_request;
use crate::metrics::Metrics;
use crate::models::{
    Banner, Field, JobRequest, NOT_READY_MESSAGE, Preview, StatusReport, Variant,
};
use crate::state::{StateChange, StateManager};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;

/// Banner text after a successful preview or a printer becoming ready.
pub const OK_MESSAGE: &str = "Ok";

/// Banner text while a print job is in flight.
pub const PRINTING_MESSAGE: &str = "Printing...";

/// Banner text after a successful print.
pub const PRINTED_MESSAGE: &str = "Printed";

/// Orchestrates enumeration loading, status polling, preview and print.
///
/// Cheap to clone; clones share state, backend and metrics, so an operation
/// can be moved into a spawned task.
pub struct LabelSession<B: LabelBackend + 'static> {
    state: Arc<StateManager>,
    backend: Arc<B>,
    metrics: Arc<Metrics>,
    discard_stale_previews: bool,
}

impl<B: LabelBackend + 'static> Clone for LabelSession<B> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            backend: Arc::clone(&self.backend),
            metrics: Arc::clone(&self.metrics),
            discard_stale_previews: self.discard_stale_previews,
        }
    }
}

impl<B: LabelBackend + 'static> LabelSession<B> {
    pub fn new(state: Arc<StateManager>, backend: Arc<B>, metrics: Arc<Metrics>) -> Self {
        Self {
            state,
            backend,
            metrics,
            discard_stale_previews: true,
        }
    }

    /// Whether preview responses older than the latest request are dropped.
    ///
    /// With this off the last response to arrive wins, whatever its age.
    pub fn with_stale_preview_guard(mut self, enabled: bool) -> Self {
        self.discard_stale_previews = enabled;
        self
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Load option lists, then show `variant`. Mirrors page load: the
    /// enumeration fetch completes before the first preview is requested.
    pub async fn start(&self, variant: Variant) {
        self.load_enumerations().await;
        self.select_variant(variant).await;
    }

    /// Fetch `/config` and populate the option lists.
    pub async fn load_enumerations(&self) {
        if let Err(e) = self.try_load_enumerations().await {
            tracing::debug!("Enumeration load failed: {}", e);
        }
    }

    pub async fn try_load_enumerations(&self) -> BackendResult<()> {
        match self.backend.fetch_config().await {
            Ok(enumerations) => {
                tracing::info!(
                    "Loaded options: {} printers, {} tapes, {} fonts, {} dictionaries",
                    enumerations.printers.len(),
                    enumerations.tapes.len(),
                    enumerations.fonts.len(),
                    enumerations.dictionaries.len()
                );
                self.state.load_enumerations(enumerations);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load backend configuration: {}", e);
                self.state.set_banner(Banner::failure(e.detail()));
                Err(e)
            }
        }
    }

    /// Switch the active variant and refresh the preview.
    ///
    /// Group visibility and the navigation indicator follow from the active
    /// variant, so they can never disagree with it. Values of groups that
    /// become hidden are kept but no longer read into requests.
    pub async fn select_variant(&self, variant: Variant) {
        tracing::info!("Selecting variant: {}", variant);
        self.state.set_variant(variant);
        self.refresh_preview().await;
    }

    /// Record an operator edit and refresh the preview.
    pub async fn edit_field(&self, field: Field, value: String) {
        tracing::debug!("Field edited: {} = {:?}", field, value);
        self.state.set_field(field, value);
        self.refresh_preview().await;
    }

    /// Build the request for the current configuration.
    pub fn build_request(&self) -> JobRequest {
        self.state.read(|s| build_request(&s.label))
    }

    /// Poll `/status` and apply the result (awaited: the blocking form).
    pub async fn refresh_status(&self) {
        self.metrics.record_status_poll();
        match self.backend.fetch_status().await {
            Ok(report) => {
                self.apply_status(&report);
            }
            Err(e) => {
                tracing::warn!("Status poll failed: {}", e);
                self.state.update(|s| {
                    s.printer_ready = false;
                    s.banner = Banner::failure(e.detail());
                });
            }
        }
    }

    /// Poll `/status` without waiting for the result.
    pub fn spawn_status_refresh(&self) -> JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move { session.refresh_status().await })
    }

    /// Apply a status report to the selected printer.
    ///
    /// Not ready (or absent from the report) raises the fixed danger banner.
    /// "Ok" is announced only on the transition into ready. The reported
    /// media always overwrites the tape field.
    pub fn apply_status(&self, report: &StatusReport) -> Vec<StateChange> {
        self.state.update(|s| {
            let printer = s.label.values.printer.clone();
            let status = report.get(&printer);

            match status {
                Some(status) if status.ready => {
                    if !s.printer_ready {
                        s.banner = Banner::success(OK_MESSAGE);
                    }
                    s.printer_ready = true;
                }
                _ => {
                    if status.is_none() {
                        tracing::debug!("Printer '{}' missing from status report", printer);
                    }
                    s.banner = Banner::danger(NOT_READY_MESSAGE);
                    s.printer_ready = false;
                }
            }

            if let Some(status) = status {
                s.label.values.tape = status.media.clone();
            }
        })
    }

    /// Refresh the preview for the current configuration.
    ///
    /// The status poll is spawned alongside the preview request rather than
    /// awaited before it; whichever response lands last writes the banner.
    pub async fn refresh_preview(&self) {
        let status = self.spawn_status_refresh();
        if let Err(e) = self.try_preview().await {
            tracing::debug!("Preview refresh failed: {}", e);
        }
        if let Err(e) = status.await {
            tracing::warn!("Status refresh task failed: {}", e);
        }
    }

    /// Request a preview and apply it.
    ///
    /// Returns `Ok(None)` when the response was superseded by a newer request
    /// and discarded.
    pub async fn try_preview(&self) -> BackendResult<Option<Preview>> {
        let (request, token, max_width) = self.state.update_untracked(|s| {
            let token = s.next_preview_token();
            (build_request(&s.label), token, s.preview_width)
        });

        tracing::debug!(
            "Requesting preview #{} ({}, max_width={})",
            token,
            request.label_type().unwrap_or_default(),
            max_width
        );

        self.metrics.record_preview_requested();
        let started = Instant::now();
        let result = self.backend.preview(&request, max_width).await;
        self.metrics.record_preview_time(started.elapsed());

        let discard = self.discard_stale_previews;
        let mut applied = false;

        match result {
            Ok(response) => {
                let preview = Preview::from_response(&response);
                self.state.update(|s| {
                    if discard && !s.is_latest_preview(token) {
                        return;
                    }
                    s.preview = Some(preview.clone());
                    s.banner = Banner::success(OK_MESSAGE);
                    applied = true;
                });

                if !applied {
                    tracing::debug!("Discarding stale preview #{}", token);
                    self.metrics.record_preview_discarded();
                    return Ok(None);
                }
                Ok(Some(preview))
            }
            Err(e) => {
                self.metrics.record_preview_failed();
                tracing::warn!("Preview #{} failed: {}", token, e);
                self.state.update(|s| {
                    if discard && !s.is_latest_preview(token) {
                        return;
                    }
                    s.banner = Banner::failure(e.detail());
                    applied = true;
                });

                if !applied {
                    self.metrics.record_preview_discarded();
                }
                Err(e)
            }
        }
    }

    /// Submit the current configuration as a single print job.
    pub async fn submit_print(&self) {
        if let Err(e) = self.try_print().await {
            tracing::debug!("Print submission failed: {}", e);
        }
    }

    pub async fn try_print(&self) -> BackendResult<()> {
        self.state.set_banner(Banner::success(PRINTING_MESSAGE));

        let request = self.build_request();
        tracing::info!(
            "Submitting print job: {}",
            request.label_type().unwrap_or_default()
        );

        self.metrics.record_print_submitted();
        match self.backend.print(&request).await {
            Ok(()) => {
                tracing::info!("Print job accepted");
                self.state.set_banner(Banner::success(PRINTED_MESSAGE));
                Ok(())
            }
            Err(e) => {
                tracing::error!("Print job failed: {}", e);
                self.metrics.record_print_failed();
                self.state.set_banner(Banner::failure(e.detail()));
                Err(e)
            }
        }
    }
}
