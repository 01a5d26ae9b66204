//! SSE task-event bridge.
//!
//! The backend exposes one unified `text/event-stream` endpoint carrying
//! `connected`, `version`, and `task_event` payloads. This module keeps a
//! single upstream connection per process and fans events out to any number
//! of subscribers:
//!
//! - `stream` — the wire event types
//! - `sse` — incremental `text/event-stream` frame decoder
//! - `client` — the reconnecting connection task and its state machine
//! - `bridge` — reference-counted broker actor owning the connection
//!
//! Events for a given task id reach every subscriber in emission order;
//! there is no ordering guarantee across different tasks.

pub mod bridge;
pub mod client;
pub mod sse;
pub mod stream;

pub use bridge::{BridgeHandle, EventBridge, Subscription, TaskSubscription};
pub use client::ConnectionState;
pub use sse::{SseDecoder, SseFrame};
pub use stream::{ServerEvent, TaskEvent};
