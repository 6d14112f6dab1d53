//! WebSocket message types
//!
//! Server→client payloads (snapshots and deadline notifications) and the
//! client→server control message.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HubError, Result};
use crate::store::{DeadlineEvent, Item};

// == Server Message ==
/// Everything the hub pushes to connected clients.
///
/// Serialized with a `type` tag: `todos`, `deadline_soon`, `deadline_passed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full state of the item store
    Todos { todos: Vec<Item> },
    /// An item is inside the approaching window
    DeadlineSoon {
        task: String,
        deadline: DateTime<Utc>,
        message: String,
    },
    /// An item's deadline passed
    DeadlinePassed {
        task: String,
        deadline: DateTime<Utc>,
        message: String,
    },
}

impl ServerMessage {
    /// Serializes the message into the text frame payload.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// == Notification ==
/// Kind of deadline notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Approaching,
    Elapsed,
}

/// A deadline notification; built per sweep, broadcast, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub task: String,
    pub deadline: DateTime<Utc>,
    pub message: String,
}

impl Notification {
    /// Notification for an item still inside the approaching window.
    pub fn approaching(item: &Item, remaining: Duration) -> Self {
        Self {
            kind: NotificationKind::Approaching,
            task: item.task.clone(),
            deadline: item.deadline,
            message: format!("Deadline is approaching! {}", format_remaining(remaining)),
        }
    }

    /// Notification for an item whose deadline passed.
    pub fn elapsed(item: &Item) -> Self {
        Self {
            kind: NotificationKind::Elapsed,
            task: item.task.clone(),
            deadline: item.deadline,
            message: "Deadline has passed!".to_string(),
        }
    }
}

impl From<&DeadlineEvent> for Notification {
    fn from(event: &DeadlineEvent) -> Self {
        match event {
            DeadlineEvent::Approaching { item, remaining } => Self::approaching(item, *remaining),
            DeadlineEvent::Elapsed { item } => Self::elapsed(item),
        }
    }
}

impl From<Notification> for ServerMessage {
    fn from(n: Notification) -> Self {
        match n.kind {
            NotificationKind::Approaching => ServerMessage::DeadlineSoon {
                task: n.task,
                deadline: n.deadline,
                message: n.message,
            },
            NotificationKind::Elapsed => ServerMessage::DeadlinePassed {
                task: n.task,
                deadline: n.deadline,
                message: n.message,
            },
        }
    }
}

/// Formats a remaining duration as `{hours}h{minutes}m`, rounded to the
/// nearest minute.
pub fn format_remaining(remaining: Duration) -> String {
    let seconds = remaining.num_seconds().max(0);
    let minutes = (seconds + 30) / 60;
    format!("{}h{}m", minutes / 60, minutes % 60)
}

// == Client Message ==
/// Raw control message sent by a client over the live connection.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    pub action: String,
    #[serde(rename = "todoId", default)]
    pub todo_id: Option<String>,
}

/// Decoded control action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Mark the item with this identifier done
    Complete { todo_id: String },
    /// Any action the hub does not know; ignored
    Unknown(String),
}

impl ClientMessage {
    /// Decodes a text frame into a control action.
    pub fn parse(text: &str) -> Result<ClientAction> {
        let msg: ClientMessage =
            serde_json::from_str(text).map_err(|e| HubError::MalformedMessage(e.to_string()))?;

        match msg.action.as_str() {
            "complete" => msg
                .todo_id
                .map(|todo_id| ClientAction::Complete { todo_id })
                .ok_or_else(|| {
                    HubError::MalformedMessage("complete action requires todoId".to_string())
                }),
            _ => Ok(ClientAction::Unknown(msg.action)),
        }
    }
}
