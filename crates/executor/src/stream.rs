//! Long-lived consumer of the executor event stream.
//!
//! [`EventStream`] owns one background task that connects, processes
//! messages into the shared [`InMemoryJobRegistry`], and reconnects when
//! the connection drops. The compilation status pushed by the executor
//! is exposed as a [`watch`] channel.

use std::sync::Arc;

use livecheck_core::CompilationStatus;
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::client::EventStreamClient;
use crate::events::StreamEvent;
use crate::processor::process_messages;
use crate::reconnect::{reconnect_loop, ReconnectConfig};
use crate::registry::InMemoryJobRegistry;

/// Broadcast channel capacity for connection events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Handle to the running event stream task.
///
/// Created via [`EventStream::start`]; the returned `Arc` can be cloned
/// into whatever needs the registry or the compilation status.
pub struct EventStream {
    registry: Arc<InMemoryJobRegistry>,
    status_tx: watch::Sender<CompilationStatus>,
    event_tx: broadcast::Sender<StreamEvent>,
    cancel: CancellationToken,
    task_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl EventStream {
    /// Spawn the connection task. Must be called from within a Tokio runtime.
    pub fn start(
        client: EventStreamClient,
        registry: Arc<InMemoryJobRegistry>,
        initial_status: CompilationStatus,
        reconnect: ReconnectConfig,
    ) -> Arc<Self> {
        let (status_tx, _) = watch::channel(initial_status);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();

        let task = {
            let registry = Arc::clone(&registry);
            let status_tx = status_tx.clone();
            let event_tx = event_tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tracing::info!(url = client.ws_url(), "Starting event stream task");
                run_connection_loop(&client, &registry, &status_tx, &event_tx, &reconnect, &cancel)
                    .await;
                tracing::info!(url = client.ws_url(), "Event stream task exited");
            })
        };

        Arc::new(Self {
            registry,
            status_tx,
            event_tx,
            cancel,
            task_handle: Mutex::new(Some(task)),
        })
    }

    pub fn registry(&self) -> Arc<InMemoryJobRegistry> {
        Arc::clone(&self.registry)
    }

    /// Live compilation status, as last pushed or set.
    pub fn compilation_status(&self) -> watch::Receiver<CompilationStatus> {
        self.status_tx.subscribe()
    }

    /// Overwrite the compilation status, e.g. from an HTTP poll.
    pub fn set_compilation_status(&self, status: CompilationStatus) {
        self.status_tx.send_replace(status);
    }

    /// Subscribe to connection events.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.event_tx.subscribe()
    }

    /// Stop the connection task, waiting up to 5 seconds for a clean exit.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down event stream");
        self.cancel.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
        }
    }
}

/// Core connection loop: connect -> process messages -> reconnect.
///
/// Runs until the cancellation token is triggered.
async fn run_connection_loop(
    client: &EventStreamClient,
    registry: &InMemoryJobRegistry,
    status_tx: &watch::Sender<CompilationStatus>,
    event_tx: &broadcast::Sender<StreamEvent>,
    reconnect: &ReconnectConfig,
    cancel: &CancellationToken,
) {
    let mut next = tokio::select! {
        _ = cancel.cancelled() => return,
        result = client.connect() => match result {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::warn!(error = %e, "Connection failed, entering reconnect loop");
                None
            }
        },
    };

    loop {
        let conn = match next.take() {
            Some(conn) => conn,
            None => match reconnect_loop(client, reconnect, cancel).await {
                Some(conn) => conn,
                None => return,
            },
        };

        let _ = event_tx.send(StreamEvent::Connected {
            url: conn.url.clone(),
        });

        let mut ws_stream = conn.ws_stream;
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = process_messages(&mut ws_stream, registry, status_tx) => {}
        }

        let _ = event_tx.send(StreamEvent::Disconnected { url: conn.url });

        if cancel.is_cancelled() {
            return;
        }
        tracing::info!(url = client.ws_url(), "Connection lost, entering reconnect loop");
    }
}
