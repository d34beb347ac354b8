/// WebSocket real-time notification system
///
/// This module handles live connections for push delivery.
///
/// Architecture:
/// 1. ConnectionRegistry: tracks live connections, fans out broadcasts
/// 2. Protocol handler: dispatches inbound frames to the notification service
/// 3. NotificationSession: one actor per connection (read loop, heartbeat)
/// 4. Graceful disconnection: every closed session unregisters itself
pub mod messages;
pub mod protocol;
pub mod registry;
pub mod session;

pub use messages::{ClientMessage, ServerMessage};
pub use registry::{BroadcastReport, ConnectionId, ConnectionRegistry};
pub use session::NotificationSession;
