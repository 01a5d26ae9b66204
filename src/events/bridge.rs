//! Reference-counted broker for the shared event stream.
//!
//! The original app shares one SSE connection across browser tabs through a
//! SharedWorker. Here that is an explicit actor: it owns at most one
//! upstream connection, counts `BridgeHandle` references, and fans events
//! out to subscribers over channels — message-passing, no shared mutable
//! state. The connection opens when the first handle is acquired and closes
//! when the last one is dropped.
//!
//! New subscribers immediately receive the cached last `connected` and
//! `version` events, so a late-joining tab doesn't wait for the next server
//! push. Events for one task id are forwarded in emission order; there is
//! no ordering guarantee between different tasks.

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use super::client::{ConnectionState, Upstream, run_connection};
use super::stream::{ServerEvent, TaskEvent};
use crate::config::ClientConfig;
use crate::errors::BridgeError;

/// Subscription to every event on the stream.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<ServerEvent>,
}

impl Subscription {
    /// Next event, or `None` once the bridge shuts down.
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        self.rx.recv().await
    }
}

/// Subscription to task events matching one task/correlation id.
pub struct TaskSubscription {
    rx: mpsc::UnboundedReceiver<TaskEvent>,
}

impl TaskSubscription {
    pub async fn recv(&mut self) -> Option<TaskEvent> {
        self.rx.recv().await
    }
}

/// Keeps the upstream connection alive while held. Dropping the last handle
/// disconnects.
pub struct BridgeHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Command::Release);
    }
}

enum Command {
    Acquire {
        reply: oneshot::Sender<()>,
    },
    Release,
    Subscribe {
        reply: oneshot::Sender<mpsc::UnboundedReceiver<ServerEvent>>,
    },
    WatchTask {
        key: String,
        reply: oneshot::Sender<mpsc::UnboundedReceiver<TaskEvent>>,
    },
    Shutdown,
}

/// Client-facing handle to the broker actor. Cheap to clone.
#[derive(Clone)]
pub struct EventBridge {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl EventBridge {
    /// Spawn the broker actor. No connection is opened until the first
    /// [`EventBridge::connect`].
    pub fn spawn(config: ClientConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        tokio::spawn(actor_loop(config, cmd_rx, state_tx));
        Self { cmd_tx, state_rx }
    }

    /// Acquire a connection reference. The upstream stream opens when the
    /// refcount goes 0 → 1.
    pub async fn connect(&self) -> Result<BridgeHandle, BridgeError> {
        let (reply, ack) = oneshot::channel();
        self.cmd_tx
            .send(Command::Acquire { reply })
            .map_err(|_| BridgeError::Closed)?;
        ack.await.map_err(|_| BridgeError::Closed)?;
        Ok(BridgeHandle {
            cmd_tx: self.cmd_tx.clone(),
        })
    }

    /// Subscribe to every event. Cached `connected`/`version` events are
    /// delivered first.
    pub async fn subscribe(&self) -> Result<Subscription, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Subscribe { reply })
            .map_err(|_| BridgeError::Closed)?;
        let rx = rx.await.map_err(|_| BridgeError::Closed)?;
        Ok(Subscription { rx })
    }

    /// Subscribe to task events whose task id or correlation/request id
    /// equals `key`.
    pub async fn watch_task(&self, key: impl Into<String>) -> Result<TaskSubscription, BridgeError> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::WatchTask {
                key: key.into(),
                reply,
            })
            .map_err(|_| BridgeError::Closed)?;
        let rx = rx.await.map_err(|_| BridgeError::Closed)?;
        Ok(TaskSubscription { rx })
    }

    /// Observe the upstream connection state machine.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Tear the bridge down regardless of outstanding handles.
    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(Command::Shutdown);
    }
}

/// Live upstream connection owned by the actor.
struct Connection {
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl Connection {
    fn open(config: &ClientConfig, upstream_tx: mpsc::UnboundedSender<Upstream>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_connection(config.clone(), upstream_tx, shutdown_rx));
        Self { shutdown_tx, task }
    }

    fn close(self) {
        let _ = self.shutdown_tx.send(true);
        // The task notices the flag on its next select; aborting here would
        // race the final state notification.
        drop(self.task);
    }
}

struct Actor {
    config: ClientConfig,
    refcount: usize,
    connection: Option<Connection>,
    upstream_tx: mpsc::UnboundedSender<Upstream>,
    subscribers: Vec<mpsc::UnboundedSender<ServerEvent>>,
    task_watchers: HashMap<String, Vec<mpsc::UnboundedSender<TaskEvent>>>,
    last_connected: Option<ServerEvent>,
    last_version: Option<ServerEvent>,
    state_tx: watch::Sender<ConnectionState>,
}

async fn actor_loop(
    config: ClientConfig,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<ConnectionState>,
) {
    let (upstream_tx, mut upstream_rx) = mpsc::unbounded_channel();
    let mut actor = Actor {
        config,
        refcount: 0,
        connection: None,
        upstream_tx,
        subscribers: Vec::new(),
        task_watchers: HashMap::new(),
        last_connected: None,
        last_version: None,
        state_tx,
    };

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(Command::Shutdown) | None => break,
                Some(cmd) => actor.handle_command(cmd),
            },
            upstream = upstream_rx.recv() => {
                // The sender half lives in the actor, so this never returns None
                if let Some(upstream) = upstream {
                    actor.handle_upstream(upstream);
                }
            }
        }
    }

    if let Some(connection) = actor.connection.take() {
        connection.close();
    }
    debug!("event bridge actor exiting");
}

impl Actor {
    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Acquire { reply } => {
                self.refcount += 1;
                debug!(refcount = self.refcount, "bridge handle acquired");
                if self.connection.is_none() {
                    self.connection =
                        Some(Connection::open(&self.config, self.upstream_tx.clone()));
                }
                let _ = reply.send(());
            }
            Command::Release => {
                self.refcount = self.refcount.saturating_sub(1);
                debug!(refcount = self.refcount, "bridge handle released");
                if self.refcount == 0
                    && let Some(connection) = self.connection.take()
                {
                    connection.close();
                }
            }
            Command::Subscribe { reply } => {
                let (tx, rx) = mpsc::unbounded_channel();
                // Late subscribers see the cached handshake immediately
                if let Some(connected) = &self.last_connected {
                    let _ = tx.send(connected.clone());
                }
                if let Some(version) = &self.last_version {
                    let _ = tx.send(version.clone());
                }
                self.subscribers.push(tx);
                let _ = reply.send(rx);
            }
            Command::WatchTask { key, reply } => {
                let (tx, rx) = mpsc::unbounded_channel();
                self.task_watchers.entry(key).or_default().push(tx);
                let _ = reply.send(rx);
            }
            Command::Shutdown => unreachable!("handled in actor_loop"),
        }
    }

    fn handle_upstream(&mut self, upstream: Upstream) {
        match upstream {
            Upstream::State(state) => {
                self.state_tx.send_replace(state);
            }
            Upstream::Event(event) => {
                match &event {
                    ServerEvent::Connected { .. } => self.last_connected = Some(event.clone()),
                    ServerEvent::Version { .. } => self.last_version = Some(event.clone()),
                    ServerEvent::TaskEvent(task_event) => self.route_task_event(task_event),
                }
                // Fan out to broadcast subscribers, pruning closed ones
                self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
            }
        }
    }

    fn route_task_event(&mut self, event: &TaskEvent) {
        let mut keys: Vec<&str> = Vec::new();
        if let Some(task_id) = event.task_id() {
            keys.push(task_id);
        }
        if let Some(request_id) = event.request_id() {
            if !keys.contains(&request_id) {
                keys.push(request_id);
            }
        } else if keys.is_empty() {
            warn!("task event without task_id or request_id");
        }
        for key in keys {
            if let Some(watchers) = self.task_watchers.get_mut(key) {
                watchers.retain(|tx| tx.send(event.clone()).is_ok());
                if watchers.is_empty() {
                    self.task_watchers.remove(key);
                }
            }
        }
    }
}
