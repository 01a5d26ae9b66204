//! Integration tests for the shared SSE event bridge against a real axum
//! server streaming `text/event-stream` over a loopback socket.

use axum::Router;
use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use futures::stream::{self, StreamExt};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::timeout;

use benchstock::config::{ClientConfig, ReconnectPolicy};
use benchstock::events::{ConnectionState, EventBridge, ServerEvent, TaskEvent};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

fn sse_frame(json: &str) -> String {
    format!("data: {}\n\n", json)
}

/// Serve a fixed sequence of events, then hold the stream open.
async fn events_handler() -> Response {
    let frames = vec![
        sse_frame(r#"{"type":"connected","client_id":"c-1"}"#),
        sse_frame(r#"{"type":"version","version":"2026.08.3"}"#),
        sse_frame(
            r#"{"type":"task_event","event_type":"task_started","task_id":"t-1","request_id":"r-1"}"#,
        ),
        sse_frame(
            r#"{"type":"task_event","event_type":"progress_update","task_id":"t-2","percent":10}"#,
        ),
        sse_frame(
            r#"{"type":"task_event","event_type":"progress_update","task_id":"t-1","request_id":"r-1","percent":50}"#,
        ),
        sse_frame(
            r#"{"type":"task_event","event_type":"task_completed","task_id":"t-1","request_id":"r-1","result":{"ok":true}}"#,
        ),
    ];
    let head = stream::iter(
        frames
            .into_iter()
            .map(|f| Ok::<_, Infallible>(f.into_bytes())),
    );
    // Keep the connection open after the scripted events so the client
    // doesn't reconnect and replay them.
    let body = Body::from_stream(head.chain(stream::pending()));
    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .expect("sse response")
}

/// Bind the mock stream server, or `None` in sandboxes that forbid it.
async fn start_server() -> Option<SocketAddr> {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Skipping SSE test (cannot bind): {:?}", e);
            return None;
        }
    };
    let addr = listener.local_addr().expect("local addr");
    let app = Router::new().route("/api/events", get(events_handler));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Some(addr)
}

fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::with_values(format!("http://{}", addr), "/api/events")
        .expect("config")
        .with_reconnect(ReconnectPolicy {
            initial: Duration::from_millis(50),
            max: Duration::from_millis(200),
            multiplier: 2.0,
        })
}

#[tokio::test]
async fn subscriber_receives_stream_in_order() {
    let Some(addr) = start_server().await else {
        return;
    };
    let bridge = EventBridge::spawn(config_for(addr));
    let mut sub = bridge.subscribe().await.unwrap();
    let _handle = bridge.connect().await.unwrap();

    let first = timeout(RECV_TIMEOUT, sub.recv()).await.unwrap().unwrap();
    assert!(matches!(first, ServerEvent::Connected { .. }));

    let second = timeout(RECV_TIMEOUT, sub.recv()).await.unwrap().unwrap();
    match second {
        ServerEvent::Version { version, .. } => assert_eq!(version, "2026.08.3"),
        other => panic!("Expected version event, got {:?}", other),
    }

    bridge.shutdown();
}

#[tokio::test]
async fn task_watcher_sees_its_events_in_emission_order() {
    let Some(addr) = start_server().await else {
        return;
    };
    let bridge = EventBridge::spawn(config_for(addr));
    let mut watcher = bridge.watch_task("t-1").await.unwrap();
    let _handle = bridge.connect().await.unwrap();

    let started = timeout(RECV_TIMEOUT, watcher.recv()).await.unwrap().unwrap();
    assert!(matches!(started, TaskEvent::TaskStarted { .. }));

    let progress = timeout(RECV_TIMEOUT, watcher.recv()).await.unwrap().unwrap();
    match &progress {
        TaskEvent::ProgressUpdate { task_id, percent, .. } => {
            // The t-2 event interleaved on the wire must not appear here
            assert_eq!(task_id, "t-1");
            assert_eq!(*percent, Some(50));
        }
        other => panic!("Expected progress for t-1, got {:?}", other),
    }

    let done = timeout(RECV_TIMEOUT, watcher.recv()).await.unwrap().unwrap();
    assert!(done.is_terminal());

    bridge.shutdown();
}

#[tokio::test]
async fn correlation_id_watcher_receives_task_events() {
    let Some(addr) = start_server().await else {
        return;
    };
    let bridge = EventBridge::spawn(config_for(addr));
    let mut watcher = bridge.watch_task("r-1").await.unwrap();
    let _handle = bridge.connect().await.unwrap();

    let event = timeout(RECV_TIMEOUT, watcher.recv()).await.unwrap().unwrap();
    assert_eq!(event.request_id(), Some("r-1"));

    bridge.shutdown();
}

#[tokio::test]
async fn late_subscriber_gets_cached_handshake_immediately() {
    let Some(addr) = start_server().await else {
        return;
    };
    let bridge = EventBridge::spawn(config_for(addr));
    let _handle = bridge.connect().await.unwrap();

    // Wait until the stream is connected and the handshake cached
    let mut first = bridge.subscribe().await.unwrap();
    timeout(RECV_TIMEOUT, first.recv()).await.unwrap().unwrap();
    timeout(RECV_TIMEOUT, first.recv()).await.unwrap().unwrap();

    // A late subscriber sees the cached connected + version without any
    // new server push
    let mut late = bridge.subscribe().await.unwrap();
    let a = timeout(RECV_TIMEOUT, late.recv()).await.unwrap().unwrap();
    let b = timeout(RECV_TIMEOUT, late.recv()).await.unwrap().unwrap();
    assert!(matches!(a, ServerEvent::Connected { .. }));
    assert!(matches!(b, ServerEvent::Version { .. }));

    bridge.shutdown();
}

#[tokio::test]
async fn dropping_last_handle_disconnects() {
    let Some(addr) = start_server().await else {
        return;
    };
    let bridge = EventBridge::spawn(config_for(addr));
    let mut state = bridge.connection_state();

    let first = bridge.connect().await.unwrap();
    let second = bridge.connect().await.unwrap();

    // Reach the connected state
    timeout(RECV_TIMEOUT, async {
        while *state.borrow() != ConnectionState::Connected {
            state.changed().await.unwrap();
        }
    })
    .await
    .expect("never connected");

    // One of two handles dropping must not disconnect
    drop(first);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*state.borrow(), ConnectionState::Connected);

    // Last handle dropping closes the upstream connection
    drop(second);
    timeout(RECV_TIMEOUT, async {
        while *state.borrow() != ConnectionState::Disconnected {
            state.changed().await.unwrap();
        }
    })
    .await
    .expect("never disconnected");

    bridge.shutdown();
}
