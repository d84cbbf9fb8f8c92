//! Integration tests for LabelSession
//!
//! These tests verify:
//! - Out-of-order preview responses and the stale-preview guard
//! - Edits flowing into the next request
//! - Status polling running alongside the preview
//! - Metrics recorded along the way

use async_trait::async_trait;
use labelpanel::models::{
    Dimension, EnumerationSet, Field, PreviewResponse, PrinterStatus, StatusReport,
};
use labelpanel::services::{BackendResult, LabelBackend};
use labelpanel::{JobRequest, LabelSession, Metrics, StateManager, Variant};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

type PendingPreview = oneshot::Receiver<BackendResult<PreviewResponse>>;

/// Backend whose preview responses are released by the test.
///
/// Each preview call takes the next queued receiver and reports on `started`
/// once its request is in flight. With nothing queued it answers at once.
struct FakeBackend {
    pending: Mutex<VecDeque<PendingPreview>>,
    started: mpsc::UnboundedSender<()>,
    requests: Mutex<Vec<JobRequest>>,
}

impl FakeBackend {
    fn new() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        let backend = Self {
            pending: Mutex::new(VecDeque::new()),
            started,
            requests: Mutex::new(Vec::new()),
        };
        (backend, started_rx)
    }

    fn queue(&self) -> oneshot::Sender<BackendResult<PreviewResponse>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }
}

fn response(caption_height: &str) -> PreviewResponse {
    PreviewResponse {
        height: Dimension::Text(caption_height.to_string()),
        width: Dimension::Number(2.0),
        preview: "iVBORw0KGgo=".to_string(),
    }
}

#[async_trait]
impl LabelBackend for FakeBackend {
    async fn fetch_config(&self) -> BackendResult<EnumerationSet> {
        Ok(EnumerationSet {
            printers: vec!["P1".to_string()],
            tapes: vec!["24mm".to_string()],
            ..EnumerationSet::default()
        })
    }

    async fn fetch_status(&self) -> BackendResult<StatusReport> {
        let mut report = StatusReport::new();
        report.insert(
            "P1".to_string(),
            PrinterStatus {
                media: "24mm".to_string(),
                ready: true,
            },
        );
        Ok(report)
    }

    async fn print(&self, request: &JobRequest) -> BackendResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn preview(
        &self,
        request: &JobRequest,
        _max_width: u32,
    ) -> BackendResult<PreviewResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let pending = self.pending.lock().unwrap().pop_front();
        let _ = self.started.send(());

        match pending {
            Some(rx) => rx.await.unwrap_or_else(|_| Ok(response("dropped"))),
            None => Ok(response("1")),
        }
    }
}

fn session(backend: Arc<FakeBackend>, guard: bool) -> LabelSession<FakeBackend> {
    LabelSession::new(Arc::new(StateManager::new()), backend, Arc::new(Metrics::new()))
        .with_stale_preview_guard(guard)
}

#[tokio::test]
async fn test_stale_preview_is_discarded() {
    let (backend, mut started) = FakeBackend::new();
    let backend = Arc::new(backend);
    let first_tx = backend.queue();
    let second_tx = backend.queue();
    let session = session(Arc::clone(&backend), true);

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.try_preview().await }
    });
    started.recv().await.unwrap();

    let second = tokio::spawn({
        let session = session.clone();
        async move { session.try_preview().await }
    });
    started.recv().await.unwrap();

    // Newer response lands first
    second_tx.send(Ok(response("new"))).unwrap();
    let applied = second.await.unwrap().unwrap();
    assert_eq!(applied.unwrap().caption, "new in X 2 in");

    first_tx.send(Ok(response("old"))).unwrap();
    assert!(first.await.unwrap().unwrap().is_none());

    let state = session.state().snapshot();
    assert_eq!(state.preview.unwrap().caption, "new in X 2 in");
    assert_eq!(
        session.metrics().previews_discarded.load(Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn test_last_arrival_wins_without_guard() {
    let (backend, mut started) = FakeBackend::new();
    let backend = Arc::new(backend);
    let first_tx = backend.queue();
    let second_tx = backend.queue();
    let session = session(Arc::clone(&backend), false);

    let first = tokio::spawn({
        let session = session.clone();
        async move { session.try_preview().await }
    });
    started.recv().await.unwrap();
    let second = tokio::spawn({
        let session = session.clone();
        async move { session.try_preview().await }
    });
    started.recv().await.unwrap();

    second_tx.send(Ok(response("new"))).unwrap();
    second.await.unwrap().unwrap();
    first_tx.send(Ok(response("old"))).unwrap();
    assert!(first.await.unwrap().unwrap().is_some());

    let caption = session.state().read(|s| s.preview.clone()).unwrap().caption;
    assert_eq!(caption, "old in X 2 in");
}

#[tokio::test]
async fn test_edits_reach_the_next_request() {
    let (backend, _started) = FakeBackend::new();
    let backend = Arc::new(backend);
    let session = session(Arc::clone(&backend), true);

    session.select_variant(Variant::Wrap).await;
    session.edit_field(Field::Label, "eth0".to_string()).await;
    session.edit_field(Field::Length, "2.5".to_string()).await;

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);

    let last = requests.last().unwrap();
    assert_eq!(last.label_type(), Some("wrap"));
    assert_eq!(last.field("label"), Some(&json!("eth0")));
    assert_eq!(last.field("length"), Some(&json!(320)));
    assert_eq!(last.field("size"), None);
}

#[tokio::test]
async fn test_start_loads_options_then_previews() {
    let (backend, _started) = FakeBackend::new();
    let backend = Arc::new(backend);
    let session = session(Arc::clone(&backend), true);

    session.start(Variant::Qr).await;

    let state = session.state().snapshot();
    assert_eq!(state.active_variant(), Variant::Qr);
    assert_eq!(state.label.values.printer, "P1");
    assert!(state.printer_ready);
    assert_eq!(state.banner.message, "Ok");

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests[0].field("printer"), Some(&json!("P1")));
    assert_eq!(
        session.metrics().status_polls.load(Ordering::Relaxed),
        1
    );
}

#[tokio::test]
async fn test_print_sends_current_configuration_once() {
    let (backend, _started) = FakeBackend::new();
    let backend = Arc::new(backend);
    let session = session(Arc::clone(&backend), true);
    session.state().set_variant(Variant::Flag);
    session.state().set_field(Field::Label, "DANGER");

    session.submit_print().await;

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].count, 1);
    assert_eq!(requests[0].field("label"), Some(&json!("DANGER")));
    assert_eq!(
        session.state().read(|s| s.banner.message.clone()),
        "Printed"
    );
}
