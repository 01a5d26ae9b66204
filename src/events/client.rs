//! The upstream SSE connection task.
//!
//! One task owns the HTTP connection and runs the state machine
//! Disconnected → Connecting → Connected → (message* | error) → Disconnected,
//! reconnecting after errors with capped exponential backoff. Connection
//! errors are recoverable by design; the task only exits on shutdown.

use futures_util::StreamExt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::sse::SseDecoder;
use super::stream::ServerEvent;
use crate::config::ClientConfig;

/// Connection state, observable through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What the connection task reports upstream to the bridge actor.
#[derive(Debug)]
pub(crate) enum Upstream {
    State(ConnectionState),
    Event(ServerEvent),
}

/// Run the connection loop until `shutdown_rx` flips to `true` or the
/// receiving side goes away.
pub(crate) async fn run_connection(
    config: ClientConfig,
    tx: mpsc::UnboundedSender<Upstream>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let client = reqwest::Client::new();
    let url = config.events_url();
    let mut attempt: u32 = 0;
    // Server-provided retry hint overrides the next backoff delay
    let mut retry_hint: Option<Duration> = None;

    'outer: loop {
        if *shutdown_rx.borrow() {
            break;
        }
        if tx.send(Upstream::State(ConnectionState::Connecting)).is_err() {
            break;
        }
        debug!(%url, attempt, "opening event stream");

        let request = client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send();
        let response = tokio::select! {
            resp = request => resp,
            _ = shutdown_rx.changed() => continue,
        };

        match response.and_then(|r| r.error_for_status()) {
            Ok(response) => {
                attempt = 0;
                if tx.send(Upstream::State(ConnectionState::Connected)).is_err() {
                    break;
                }
                info!(%url, "event stream connected");

                let mut body = response.bytes_stream();
                let mut decoder = SseDecoder::new();
                loop {
                    let chunk = tokio::select! {
                        chunk = body.next() => chunk,
                        _ = shutdown_rx.changed() => {
                            if *shutdown_rx.borrow() {
                                break 'outer;
                            }
                            continue;
                        }
                    };
                    match chunk {
                        Some(Ok(bytes)) => {
                            for frame in decoder.push(&bytes) {
                                if let Some(retry) = frame.retry {
                                    retry_hint = Some(retry);
                                }
                                if frame.data.is_empty() {
                                    continue;
                                }
                                match serde_json::from_str::<ServerEvent>(&frame.data) {
                                    Ok(event) => {
                                        if tx.send(Upstream::Event(event)).is_err() {
                                            break 'outer;
                                        }
                                    }
                                    Err(err) => {
                                        warn!(%err, "dropping undecodable stream event");
                                    }
                                }
                            }
                        }
                        Some(Err(err)) => {
                            warn!(%err, "event stream read failed");
                            break;
                        }
                        None => {
                            debug!("event stream closed by server");
                            break;
                        }
                    }
                }
            }
            Err(err) => {
                warn!(%err, %url, "event stream connect failed");
            }
        }

        if tx
            .send(Upstream::State(ConnectionState::Disconnected))
            .is_err()
        {
            break;
        }

        let delay = retry_hint
            .take()
            .unwrap_or_else(|| config.reconnect.delay_for(attempt));
        attempt = attempt.saturating_add(1);
        debug!(?delay, "reconnecting after backoff");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    let _ = tx.send(Upstream::State(ConnectionState::Disconnected));
    debug!("connection task exiting");
}
