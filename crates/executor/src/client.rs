//! WebSocket client for the executor's push event stream.
//!
//! [`EventStreamClient`] holds the connection configuration. Call
//! [`EventStreamClient::connect`] to establish a live
//! [`EventStreamConnection`].

use tokio_tungstenite::{connect_async, MaybeTlsStream};

/// The raw stream type produced by [`EventStreamClient::connect`].
pub type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Configuration handle for the executor event stream.
#[derive(Debug, Clone)]
pub struct EventStreamClient {
    ws_url: String,
}

/// A live WebSocket connection to the executor event stream.
pub struct EventStreamConnection {
    /// Full URL that was connected to.
    pub url: String,
    /// The raw WebSocket stream for reading frames.
    pub ws_stream: WsStream,
}

impl EventStreamClient {
    /// * `ws_url` - WebSocket base URL, e.g. `ws://localhost:3000`.
    pub fn new(ws_url: impl Into<String>) -> Self {
        let ws_url = ws_url.into().trim_end_matches('/').to_string();
        Self { ws_url }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// URL of the event endpoint.
    pub fn events_url(&self) -> String {
        format!("{}/events", self.ws_url)
    }

    /// Connect to the `/events` endpoint.
    pub async fn connect(&self) -> Result<EventStreamConnection, EventStreamError> {
        let url = self.events_url();

        let (ws_stream, _response) = connect_async(&url).await.map_err(|e| {
            EventStreamError::Connection(format!(
                "Failed to connect to executor at {}: {e}",
                self.ws_url
            ))
        })?;

        tracing::info!(url = %url, "Connected to executor event stream");

        Ok(EventStreamConnection { url, ws_stream })
    }
}

/// Errors that can occur when working with the event stream client.
#[derive(Debug, thiserror::Error)]
pub enum EventStreamError {
    /// Failed to establish the WebSocket connection.
    #[error("Connection error: {0}")]
    Connection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_url_strips_trailing_slash() {
        let client = EventStreamClient::new("ws://localhost:3000/");
        assert_eq!(client.ws_url(), "ws://localhost:3000");
        assert_eq!(client.events_url(), "ws://localhost:3000/events");
    }

    #[tokio::test]
    async fn connect_to_closed_port_fails() {
        let client = EventStreamClient::new("ws://127.0.0.1:9");
        let err = client.connect().await.err().expect("nothing listens on port 9");
        assert!(err.to_string().contains("127.0.0.1:9"));
    }
}
