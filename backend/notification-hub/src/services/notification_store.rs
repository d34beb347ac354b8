/// In-memory notification store
///
/// Holds the canonical newest-first sequence of notifications. Readers share
/// the lock; `insert`, `mark_read` and `clear` take it exclusively. The store
/// performs no validation and no uniqueness checks.
use crate::error::{AppError, Result};
use crate::models::{ListScope, Notification};
use parking_lot::RwLock;
use std::collections::VecDeque;

pub trait NotificationStore: Send + Sync {
    /// Snapshot of the requested scope, newest first
    fn list(&self, scope: ListScope) -> Vec<Notification>;

    /// Prepend a notification. The caller assigns id and timestamp.
    fn insert(&self, notification: Notification);

    /// Flip `read` to true, or fail with `NotFound`
    fn mark_read(&self, id: &str) -> Result<()>;

    /// Remove every notification
    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<VecDeque<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationStore for InMemoryNotificationStore {
    fn list(&self, scope: ListScope) -> Vec<Notification> {
        let notifications = self.notifications.read();
        notifications
            .iter()
            .filter(|n| scope.includes(n))
            .cloned()
            .collect()
    }

    fn insert(&self, notification: Notification) {
        self.notifications.write().push_front(notification);
    }

    fn mark_read(&self, id: &str) -> Result<()> {
        let mut notifications = self.notifications.write();
        match notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                Ok(())
            }
            None => Err(AppError::NotFound(id.to_string())),
        }
    }

    fn clear(&self) {
        self.notifications.write().clear();
    }

    fn len(&self) -> usize {
        self.notifications.read().len()
    }
}
