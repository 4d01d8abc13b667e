//! Connection-level events emitted by the event stream task.
//!
//! Job and compilation updates are not broadcast here: they land in the
//! [`InMemoryJobRegistry`](crate::registry::InMemoryJobRegistry) and the
//! compilation status channel instead.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StreamEvent {
    /// The WebSocket connection to the executor was established.
    Connected { url: String },

    /// The WebSocket connection to the executor was lost.
    Disconnected { url: String },
}
