/// Application handle shared by the HTTP gateway and WebSocket sessions
///
/// Owns exactly one service (and through it one store) plus the connection
/// registry. Built once in `main` and handed out through `web::Data`.
use crate::config::WebSocketConfig;
use crate::error::Result;
use crate::models::Notification;
use crate::services::{NotificationService, NotificationStore};
use crate::websocket::ConnectionRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub struct NotificationHub {
    service: NotificationService,
    registry: ConnectionRegistry,
    websocket: WebSocketConfig,
    /// Serializes create+broadcast so every connection sees notifications in
    /// store insertion order. Never held while waiting on a client.
    publish_lock: Mutex<()>,
}

impl NotificationHub {
    pub fn new(store: Arc<dyn NotificationStore>, websocket: WebSocketConfig) -> Self {
        Self {
            service: NotificationService::new(store),
            registry: ConnectionRegistry::with_capacity(websocket.send_queue_capacity),
            websocket,
            publish_lock: Mutex::new(()),
        }
    }

    pub fn service(&self) -> &NotificationService {
        &self.service
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn websocket_config(&self) -> &WebSocketConfig {
        &self.websocket
    }

    /// Create a notification and push it to every live connection
    pub async fn publish(&self, title: &str, message: &str) -> Result<Notification> {
        let _guard = self.publish_lock.lock().await;

        let notification = self.service.create(title, message)?;
        let report = self.registry.broadcast(&notification).await;

        info!(
            notification_id = %notification.id,
            delivered = report.delivered,
            dropped = report.dropped,
            "Broadcast notification"
        );
        Ok(notification)
    }
}
