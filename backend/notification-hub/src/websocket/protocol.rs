/// Inbound frame dispatch
///
/// Stateless: every decoded frame from a connection goes through
/// `handle_message`, which calls the service and returns the reply to send
/// back on that same connection, if the frame type defines one. Errors are
/// returned to the session for logging; the protocol has no error frame.
use super::{ClientMessage, ServerMessage};
use crate::error::{AppError, Result};
use crate::services::NotificationService;
use tracing::warn;

pub fn handle_message(
    service: &NotificationService,
    message: ClientMessage,
) -> Result<Option<ServerMessage>> {
    match message {
        ClientMessage::GetNotifications => Ok(Some(ServerMessage::notifications_list(
            service.list_unread(),
        ))),
        ClientMessage::MarkRead { notification_id } => {
            let id = notification_id.ok_or_else(|| {
                AppError::InvalidArgument("notification id is required".into())
            })?;
            service.mark_read(&id)?;
            Ok(None)
        }
        ClientMessage::ClearAll => {
            service.clear_all();
            Ok(None)
        }
        ClientMessage::Unknown => {
            warn!("Ignoring frame with unknown type");
            Ok(None)
        }
    }
}
