/// WebSocket frame types for real-time notifications
use crate::models::Notification;
use serde::{Deserialize, Serialize};

/// Frames sent by clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the unread listing
    GetNotifications,

    /// Acknowledge a single notification
    MarkRead {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        notification_id: Option<String>,
    },

    /// Drop every stored notification
    ClearAll,

    /// Any other `type` value. Logged and ignored.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Decode a text frame. Fails on anything that is not a JSON object
    /// carrying a string `type`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Frames pushed by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A newly created notification, sent to every live connection
    Notification { notification: Notification },

    /// Reply to `get_notifications`
    NotificationsList { notifications: Vec<Notification> },
}

impl ServerMessage {
    pub fn notification(notification: Notification) -> Self {
        ServerMessage::Notification { notification }
    }

    pub fn notifications_list(notifications: Vec<Notification>) -> Self {
        ServerMessage::NotificationsList { notifications }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
