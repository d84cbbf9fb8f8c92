// EventLoopBridge - Hands work between the tokio runtime and the Slint event loop
//
// Backend requests run on tokio workers; widget properties may only be touched
// on Slint's thread. The bridge carries closures from the former to the latter
// and lets Slint callbacks start async work without blocking the window.

use crate::metrics::Metrics;
use slint::ComponentHandle;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

type UiUpdate<T> = Box<dyn FnOnce(&T) + Send>;

/// Capacity of the pending UI update queue
pub const UI_UPDATE_CAPACITY: usize = 100;

/// Coordinates between the tokio runtime and the Slint event loop
///
/// - [`update_ui()`](Self::update_ui) queues a property update from any thread
/// - [`spawn_async()`](Self::spawn_async) runs a future on tokio from a callback
///
/// # Example
/// ```ignore
/// let bridge = EventLoopBridge::new(&ui, runtime.handle().clone(), metrics);
///
/// let handle = bridge.clone_handle();
/// ui.on_print_clicked(move || {
///     let session = session.clone();
///     handle.spawn_async(move || async move { session.submit_print().await });
/// });
/// ```
pub struct EventLoopBridge<T: ComponentHandle> {
    handle: EventLoopBridgeHandle<T>,
}

impl<T: ComponentHandle + 'static> EventLoopBridge<T> {
    /// Create the bridge and start its forwarding thread.
    ///
    /// The thread drains the update queue and re-posts each closure with
    /// `upgrade_in_event_loop`; it exits once the window is gone or every
    /// sender is dropped.
    pub fn new(ui: &T, tokio_handle: tokio::runtime::Handle, metrics: Arc<Metrics>) -> Self {
        let forward_weak = ui.as_weak();
        let (ui_update_tx, mut ui_update_rx) = mpsc::channel::<UiUpdate<T>>(UI_UPDATE_CAPACITY);

        std::thread::spawn(move || {
            tracing::debug!("UI bridge thread started");

            while let Some(update_fn) = ui_update_rx.blocking_recv() {
                let result = forward_weak.upgrade_in_event_loop(move |ui| {
                    update_fn(&ui);
                });

                if let Err(e) = result {
                    tracing::warn!("Event loop gone, stopping UI bridge: {:?}", e);
                    break;
                }
            }

            tracing::debug!("UI bridge thread terminated");
        });

        Self {
            handle: EventLoopBridgeHandle {
                tokio_handle,
                ui_update_tx,
                metrics,
            },
        }
    }

    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        self.handle.update_ui(update);
    }

    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn_async(future_factory);
    }

    /// Cloneable handle for moving into Slint callbacks and threads
    pub fn clone_handle(&self) -> EventLoopBridgeHandle<T> {
        self.handle.clone()
    }
}

/// Lightweight handle that can be cloned into callbacks
pub struct EventLoopBridgeHandle<T: ComponentHandle> {
    tokio_handle: tokio::runtime::Handle,
    ui_update_tx: mpsc::Sender<UiUpdate<T>>,
    metrics: Arc<Metrics>,
}

// Manual Clone implementation to avoid requiring T: Clone
impl<T: ComponentHandle> Clone for EventLoopBridgeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            tokio_handle: self.tokio_handle.clone(),
            ui_update_tx: self.ui_update_tx.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T: ComponentHandle + 'static> EventLoopBridgeHandle<T> {
    /// Queue a UI update from any thread.
    ///
    /// A full queue drops the update; the next state event repaints anyway.
    pub fn update_ui<F>(&self, update: F)
    where
        F: FnOnce(&T) + Send + 'static,
    {
        enqueue(&self.ui_update_tx, Box::new(update), &self.metrics);
    }

    /// Run a future on the tokio runtime
    pub fn spawn_async<F, Fut>(&self, future_factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.tokio_handle.spawn(async move {
            future_factory().await;
        });
    }
}

/// Try to queue one update, counting it as sent or dropped.
fn enqueue<U>(tx: &mpsc::Sender<U>, update: U, metrics: &Metrics) -> bool {
    match tx.try_send(update) {
        Ok(_) => {
            metrics.record_ui_update();
            true
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            metrics.record_ui_channel_full();
            tracing::warn!("UI update channel full - dropping update");
            false
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::warn!("Failed to send UI update - bridge thread has stopped");
            false
        }
    }
}
