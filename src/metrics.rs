// Performance metrics module
//
// Lightweight counters for backend traffic and UI churn

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Session metrics
///
/// Uses atomic operations so the session, the state subscription thread and
/// the UI bridge can all record without locks. Logged on shutdown.
#[derive(Debug)]
pub struct Metrics {
    /// Preview requests sent to the backend
    pub previews_requested: AtomicU64,

    /// Preview requests that failed
    pub previews_failed: AtomicU64,

    /// Preview responses dropped because a newer request was issued
    pub previews_discarded: AtomicU64,

    /// Print jobs submitted
    pub prints_submitted: AtomicU64,

    /// Print jobs the backend rejected or that never reached it
    pub prints_failed: AtomicU64,

    /// Status polls issued
    pub status_polls: AtomicU64,

    /// Total time spent waiting for preview responses in milliseconds
    pub total_preview_time_ms: AtomicU64,

    /// Number of UI updates sent
    pub ui_updates: AtomicU64,

    /// Number of UI update channel full errors
    pub ui_update_channel_full: AtomicU64,

    /// Session start time
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            previews_requested: AtomicU64::new(0),
            previews_failed: AtomicU64::new(0),
            previews_discarded: AtomicU64::new(0),
            prints_submitted: AtomicU64::new(0),
            prints_failed: AtomicU64::new(0),
            status_polls: AtomicU64::new(0),
            total_preview_time_ms: AtomicU64::new(0),
            ui_updates: AtomicU64::new(0),
            ui_update_channel_full: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_preview_requested(&self) {
        self.previews_requested.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preview_failed(&self) {
        self.previews_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preview_discarded(&self) {
        self.previews_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preview_time(&self, duration: Duration) {
        self.total_preview_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_print_submitted(&self) {
        self.prints_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_print_failed(&self) {
        self.prints_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_status_poll(&self) {
        self.status_polls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_update(&self) {
        self.ui_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ui_channel_full(&self) {
        self.ui_update_channel_full.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average round trip of a preview request in milliseconds
    pub fn avg_preview_time_ms(&self) -> f64 {
        let total = self.total_preview_time_ms.load(Ordering::Relaxed);
        let count = self.previews_requested.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Session Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Previews: {} requested, {} failed, {} stale (avg: {:.2}ms)",
            self.previews_requested.load(Ordering::Relaxed),
            self.previews_failed.load(Ordering::Relaxed),
            self.previews_discarded.load(Ordering::Relaxed),
            self.avg_preview_time_ms()
        );
        tracing::info!(
            "Prints: {} submitted, {} failed; status polls: {}",
            self.prints_submitted.load(Ordering::Relaxed),
            self.prints_failed.load(Ordering::Relaxed),
            self.status_polls.load(Ordering::Relaxed)
        );
        tracing::info!(
            "UI updates: {}, channel full errors: {}",
            self.ui_updates.load(Ordering::Relaxed),
            self.ui_update_channel_full.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
