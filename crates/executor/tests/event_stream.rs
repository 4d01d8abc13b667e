//! End-to-end tests for `EventStream` against a stub WebSocket executor.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use livecheck_core::{CompilationStatus, CompilerState, JobId, JobRegistry, JobState};
use livecheck_executor::events::StreamEvent;
use livecheck_executor::{EventStream, EventStreamClient, InMemoryJobRegistry, ReconnectConfig};

const FRAMES: [&str; 4] = [
    r#"{"type":"compilation_status","data":{"compiled_at":1,"state":"Compiled"}}"#,
    r#"{"type":"job","data":{"id":1,"analysis":"Sign","state":"Queued"}}"#,
    r#"{"type":"unknown","data":null}"#,
    r#"{"type":"job","data":{"id":1,"analysis":"Sign","state":"Succeeded","stdout":"ok"}}"#,
];

async fn events(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket| async move {
        for frame in FRAMES {
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        // Keep the connection open until the client goes away.
        while socket.recv().await.is_some() {}
    })
}

async fn wait_for_state(registry: &InMemoryJobRegistry, id: JobId, state: JobState) {
    loop {
        if registry.get_record(id).map(|r| r.state) == Some(state) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn pushes_records_and_status_into_registry() {
    let addr = common::spawn_stub(Router::new().route("/events", get(events))).await;
    let registry = Arc::new(InMemoryJobRegistry::new());

    let stream = EventStream::start(
        EventStreamClient::new(format!("ws://{addr}")),
        Arc::clone(&registry),
        CompilationStatus::new(CompilerState::Compiling),
        ReconnectConfig::default(),
    );
    let mut status = stream.compilation_status();
    let mut events = stream.subscribe();

    let connected = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("connected in time")
        .expect("event channel open");
    assert_eq!(
        connected,
        StreamEvent::Connected {
            url: format!("ws://{addr}/events")
        }
    );

    tokio::time::timeout(Duration::from_secs(5), status.wait_for(|s| s.is_ready()))
        .await
        .expect("status pushed in time")
        .expect("status channel open");

    tokio::time::timeout(
        Duration::from_secs(5),
        wait_for_state(&registry, JobId(1), JobState::Succeeded),
    )
    .await
    .expect("job record pushed in time");

    assert_eq!(
        registry.get_record(JobId(1)).map(|r| r.stdout),
        Some("ok".to_string())
    );

    stream.shutdown().await;
}

#[tokio::test]
async fn manual_status_overrides_are_visible() {
    let stream = EventStream::start(
        EventStreamClient::new("ws://127.0.0.1:9"),
        Arc::new(InMemoryJobRegistry::new()),
        CompilationStatus::new(CompilerState::Compiling),
        ReconnectConfig::default(),
    );
    let mut status = stream.compilation_status();

    stream.set_compilation_status(CompilationStatus::new(CompilerState::Compiled));

    assert!(status.borrow_and_update().is_ready());
    stream.shutdown().await;
}
