/// WebSocket Connection Registry
///
/// Tracks live connections and fans notifications out to all of them.
/// Supports:
/// - Bounded per-connection outbound queues
/// - Per-connection failure isolation during broadcast
/// - Idempotent unregistration
use super::ServerMessage;
use crate::metrics;
use crate::models::Notification;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default number of frames a connection may have queued before it is
/// considered stalled
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 64;

/// Receiving half of a connection's outbound queue
pub type FrameReceiver = mpsc::Receiver<String>;

/// Unique identifier for a registered live connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub dropped: usize,
}

/// Registry of live connections
///
/// Broadcasts share the read lock, so several may run together while
/// register/unregister wait for them to finish.
#[derive(Clone)]
pub struct ConnectionRegistry {
    connections: Arc<RwLock<HashMap<ConnectionId, mpsc::Sender<String>>>>,
    queue_capacity: usize,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SEND_QUEUE_CAPACITY)
    }

    /// `queue_capacity` is clamped to at least one frame
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new connection
    ///
    /// Returns the connection id (used for cleanup) and the receiver the
    /// session drains into its socket.
    pub async fn register(&self) -> (ConnectionId, FrameReceiver) {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let connection_id = ConnectionId::new();

        let mut connections = self.connections.write().await;
        connections.insert(connection_id, tx);
        metrics::set_live_connections(connections.len());

        debug!(
            connection_id = %connection_id,
            total = connections.len(),
            "Registered connection"
        );

        (connection_id, rx)
    }

    /// Remove a connection. Removing an unknown id is a no-op.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            metrics::set_live_connections(connections.len());
            debug!(
                connection_id = %connection_id,
                remaining = connections.len(),
                "Unregistered connection"
            );
        }
    }

    /// Push a `notification` frame to every registered connection
    ///
    /// Never fails. A connection whose queue is full or closed is treated as
    /// dead and removed once the send loop is done.
    pub async fn broadcast(&self, notification: &Notification) -> BroadcastReport {
        let frame = match ServerMessage::notification(notification.clone()).to_json() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to serialize notification frame");
                return BroadcastReport::default();
            }
        };
        self.broadcast_frame(frame).await
    }

    /// Push a pre-serialized frame to every registered connection
    async fn broadcast_frame(&self, frame: String) -> BroadcastReport {
        let mut report = BroadcastReport::default();
        let mut dead = Vec::new();

        {
            let connections = self.connections.read().await;
            for (connection_id, sender) in connections.iter() {
                match sender.try_send(frame.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        warn!(connection_id = %connection_id, "Send queue full, dropping connection");
                        dead.push(*connection_id);
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!(connection_id = %connection_id, "Connection closed, dropping");
                        dead.push(*connection_id);
                    }
                }
            }
        }

        report.dropped = dead.len();
        if !dead.is_empty() {
            let mut connections = self.connections.write().await;
            for connection_id in &dead {
                connections.remove(connection_id);
            }
            metrics::set_live_connections(connections.len());
        }

        metrics::record_broadcast(report.delivered, report.dropped);
        report
    }

    /// Whether a connection is currently registered
    pub async fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.read().await.contains_key(&connection_id)
    }

    /// Get the total number of live connections
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Get the ids of all live connections
    pub async fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.read().await.keys().copied().collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
