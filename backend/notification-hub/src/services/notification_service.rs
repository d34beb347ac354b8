/// Notification service
///
/// Business rules on top of the store:
/// 1. Title and message must be non-empty after trimming
/// 2. Mark-read requires a non-empty id
/// 3. Identifiers and timestamps are assigned here, never by callers
///
/// The service knows nothing about live connections; broadcasting a created
/// notification is the caller's job (see `Hub::publish`).
use super::NotificationStore;
use crate::error::{AppError, Result};
use crate::models::{ListScope, Notification};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Time-derived identifiers with microsecond precision. The trailing sequence
/// number keeps ids distinct when two creates land in the same tick.
#[derive(Debug, Default)]
pub struct IdGenerator {
    sequence: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", now.format("%Y%m%d%H%M%S%.6f"), seq)
    }
}

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    ids: IdGenerator,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self {
            store,
            ids: IdGenerator::new(),
        }
    }

    pub fn list_unread(&self) -> Vec<Notification> {
        self.store.list(ListScope::Unread)
    }

    /// Full listing including read notifications (debug/introspection)
    pub fn list_all(&self) -> Vec<Notification> {
        self.store.list(ListScope::All)
    }

    /// Validate, stamp and persist a new notification
    pub fn create(&self, title: &str, message: &str) -> Result<Notification> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidArgument("title is required".into()));
        }
        if message.trim().is_empty() {
            return Err(AppError::InvalidArgument("message is required".into()));
        }

        let now = Utc::now();
        let notification = Notification::new(
            self.ids.next_id(now),
            title.to_string(),
            message.to_string(),
            now,
        );
        self.store.insert(notification.clone());

        info!(notification_id = %notification.id, "Created notification");
        Ok(notification)
    }

    pub fn mark_read(&self, id: &str) -> Result<()> {
        if id.trim().is_empty() {
            return Err(AppError::InvalidArgument("notification id is required".into()));
        }
        self.store.mark_read(id)?;
        debug!(notification_id = %id, "Marked notification as read");
        Ok(())
    }

    pub fn clear_all(&self) {
        self.store.clear();
        info!("Cleared all notifications");
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }
}
