//! Event-stream message processing loop.
//!
//! Reads raw frames from the executor WebSocket, parses them into typed
//! [`ExecutorMessage`] variants, and applies them to the job registry
//! and the compilation status channel.

use futures::{Stream, StreamExt};
use livecheck_core::CompilationStatus;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::messages::{parse_message, ExecutorMessage};
use crate::registry::InMemoryJobRegistry;

/// Process frames until the stream closes, errors, or is exhausted.
///
/// Each text frame is parsed via [`parse_message`]; unparseable frames
/// are logged and skipped.
pub async fn process_messages<S>(
    ws_stream: &mut S,
    registry: &InMemoryJobRegistry,
    status_tx: &watch::Sender<CompilationStatus>,
) where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(msg_result) = ws_stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                handle_text_message(&text, registry, status_tx);
            }
            Ok(Message::Binary(_)) => {
                tracing::trace!("Ignoring binary frame");
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {
                // Handled automatically by tungstenite.
            }
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Executor event stream closed");
                break;
            }
            Ok(Message::Frame(_)) => {}
            Err(e) => {
                tracing::error!(error = %e, "Event stream receive error");
                break;
            }
        }
    }
}

fn handle_text_message(
    text: &str,
    registry: &InMemoryJobRegistry,
    status_tx: &watch::Sender<CompilationStatus>,
) {
    match parse_message(text) {
        Ok(ExecutorMessage::Job(record)) => {
            tracing::debug!(
                job_id = %record.id,
                analysis = %record.analysis,
                state = ?record.state,
                "Job record update",
            );
            registry.apply(record);
        }
        Ok(ExecutorMessage::JobRemoved(data)) => {
            tracing::debug!(job_id = %data.id, "Job removed");
            registry.remove(data.id);
        }
        Ok(ExecutorMessage::Compilation(status)) => {
            tracing::info!(state = ?status.state, "Compilation status changed");
            status_tx.send_if_modified(|current| {
                if *current == status {
                    return false;
                }
                *current = status;
                true
            });
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                raw_message = %text,
                "Failed to parse executor message",
            );
        }
    }
}
