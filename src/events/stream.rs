//! Wire types for the unified server event stream.
//!
//! The envelope is tagged by `type`; task events nest a second `event_type`
//! discriminator. Unknown task payload kinds decode to [`TaskEvent::Other`]
//! and are forwarded rather than dropped, so new backend event kinds don't
//! silently disappear from subscribers.

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// An event from the unified stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent once when the stream opens.
    Connected {
        #[serde(default)]
        client_id: Option<String>,
    },
    /// Deployment-version notification; the UI prompts a reload when it
    /// differs from the running build.
    Version {
        version: String,
        #[serde(default)]
        deployed_at: Option<DateTime<Utc>>,
    },
    /// Progress of an async AI-assisted workflow (analysis, cleanup).
    TaskEvent(TaskEvent),
}

/// One task-stream event, discriminated by `event_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    TaskStarted {
        task_id: String,
        request_id: Option<String>,
        task_kind: Option<String>,
    },
    ProgressUpdate {
        task_id: String,
        request_id: Option<String>,
        text: Option<String>,
        percent: Option<u32>,
    },
    TaskCompleted {
        task_id: String,
        request_id: Option<String>,
        result: Option<Value>,
    },
    TaskFailed {
        task_id: String,
        request_id: Option<String>,
        error: Option<String>,
    },
    /// Payload kind this client doesn't know; forwarded verbatim.
    Other {
        event_type: String,
        task_id: Option<String>,
        request_id: Option<String>,
        payload: Value,
    },
}

impl TaskEvent {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            Self::TaskStarted { task_id, .. }
            | Self::ProgressUpdate { task_id, .. }
            | Self::TaskCompleted { task_id, .. }
            | Self::TaskFailed { task_id, .. } => Some(task_id),
            Self::Other { task_id, .. } => task_id.as_deref(),
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::TaskStarted { request_id, .. }
            | Self::ProgressUpdate { request_id, .. }
            | Self::TaskCompleted { request_id, .. }
            | Self::TaskFailed { request_id, .. }
            | Self::Other { request_id, .. } => request_id.as_deref(),
        }
    }

    /// Whether this event ends the task's stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TaskCompleted { .. } | Self::TaskFailed { .. })
    }
}

// Mirror of the known variants used for (de)serialization; `TaskEvent`
// itself needs manual impls so unknown `event_type`s become `Other`.
#[derive(Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
enum KnownTaskEvent {
    TaskStarted {
        task_id: String,
        #[serde(default)]
        request_id: Option<String>,
        #[serde(default)]
        task_kind: Option<String>,
    },
    ProgressUpdate {
        task_id: String,
        #[serde(default)]
        request_id: Option<String>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        percent: Option<u32>,
    },
    TaskCompleted {
        task_id: String,
        #[serde(default)]
        request_id: Option<String>,
        #[serde(default)]
        result: Option<Value>,
    },
    TaskFailed {
        task_id: String,
        #[serde(default)]
        request_id: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl From<KnownTaskEvent> for TaskEvent {
    fn from(known: KnownTaskEvent) -> Self {
        match known {
            KnownTaskEvent::TaskStarted {
                task_id,
                request_id,
                task_kind,
            } => Self::TaskStarted {
                task_id,
                request_id,
                task_kind,
            },
            KnownTaskEvent::ProgressUpdate {
                task_id,
                request_id,
                text,
                percent,
            } => Self::ProgressUpdate {
                task_id,
                request_id,
                text,
                percent,
            },
            KnownTaskEvent::TaskCompleted {
                task_id,
                request_id,
                result,
            } => Self::TaskCompleted {
                task_id,
                request_id,
                result,
            },
            KnownTaskEvent::TaskFailed {
                task_id,
                request_id,
                error,
            } => Self::TaskFailed {
                task_id,
                request_id,
                error,
            },
        }
    }
}

impl From<&TaskEvent> for Value {
    fn from(event: &TaskEvent) -> Value {
        match event {
            TaskEvent::TaskStarted {
                task_id,
                request_id,
                task_kind,
            } => serde_json::to_value(KnownTaskEvent::TaskStarted {
                task_id: task_id.clone(),
                request_id: request_id.clone(),
                task_kind: task_kind.clone(),
            }),
            TaskEvent::ProgressUpdate {
                task_id,
                request_id,
                text,
                percent,
            } => serde_json::to_value(KnownTaskEvent::ProgressUpdate {
                task_id: task_id.clone(),
                request_id: request_id.clone(),
                text: text.clone(),
                percent: *percent,
            }),
            TaskEvent::TaskCompleted {
                task_id,
                request_id,
                result,
            } => serde_json::to_value(KnownTaskEvent::TaskCompleted {
                task_id: task_id.clone(),
                request_id: request_id.clone(),
                result: result.clone(),
            }),
            TaskEvent::TaskFailed {
                task_id,
                request_id,
                error,
            } => serde_json::to_value(KnownTaskEvent::TaskFailed {
                task_id: task_id.clone(),
                request_id: request_id.clone(),
                error: error.clone(),
            }),
            TaskEvent::Other { payload, .. } => Ok(payload.clone()),
        }
        .expect("task event serializes")
    }
}

impl Serialize for TaskEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let event_type = value
            .get("event_type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| D::Error::missing_field("event_type"))?
            .to_string();
        match serde_json::from_value::<KnownTaskEvent>(value.clone()) {
            Ok(known) => Ok(known.into()),
            Err(_) => Ok(Self::Other {
                event_type,
                task_id: value
                    .get("task_id")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                request_id: value
                    .get("request_id")
                    .and_then(|v| v.as_str())
                    .map(String::from),
                payload: value,
            }),
        }
    }
}
