use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single notification record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    /// Opaque, time-derived identifier
    pub id: String,
    pub title: String,
    pub message: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Only ever flips from false to true
    pub read: bool,
}

impl Notification {
    pub fn new(id: String, title: String, message: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            message,
            timestamp,
            read: false,
        }
    }
}

/// Which part of the store a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    All,
    Unread,
}

impl ListScope {
    pub fn includes(&self, notification: &Notification) -> bool {
        match self {
            ListScope::All => true,
            ListScope::Unread => !notification.read,
        }
    }
}

/// Request body for creating a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotificationRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
