//! Executor client library.
//!
//! Provides the HTTP API wrapper, the push event stream consumer (typed
//! message parsing, WebSocket connection management, reconnection) and
//! the in-memory job registry that the event stream keeps up to date.

pub mod api;
pub mod client;
pub mod events;
pub mod messages;
pub mod processor;
pub mod reconnect;
pub mod registry;
pub mod stream;

pub use api::ExecutorApi;
pub use client::EventStreamClient;
pub use reconnect::ReconnectConfig;
pub use registry::InMemoryJobRegistry;
pub use stream::EventStream;
