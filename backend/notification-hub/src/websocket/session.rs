//! Actix actor for a single live WebSocket connection
//!
//! Lifecycle:
//! - Opening: the HTTP handler registers the connection, then upgrades
//! - Open: inbound text frames go through the protocol handler; queued
//!   broadcast frames are drained into the socket
//! - Closed: remote close, protocol error, malformed frame, heartbeat
//!   timeout, or the registry dropping our queue. Always unregisters.

use super::protocol;
use super::registry::{ConnectionId, FrameReceiver};
use super::ClientMessage;
use crate::error::AppError;
use crate::hub::NotificationHub;
use actix::prelude::*;
use actix_web_actors::ws;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

pub struct NotificationSession {
    connection_id: ConnectionId,
    hub: Arc<NotificationHub>,
    outbound: Option<FrameReceiver>,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    last_seen: Instant,
}

impl NotificationSession {
    pub fn new(
        connection_id: ConnectionId,
        hub: Arc<NotificationHub>,
        outbound: FrameReceiver,
    ) -> Self {
        let websocket = hub.websocket_config();
        Self {
            connection_id,
            heartbeat_interval: websocket.heartbeat_interval,
            client_timeout: websocket.client_timeout,
            hub,
            outbound: Some(outbound),
            last_seen: Instant::now(),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.client_timeout;
        ctx.run_interval(self.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.last_seen) > timeout {
                warn!(
                    connection_id = %act.connection_id,
                    "WebSocket heartbeat failed, disconnecting"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let message = match ClientMessage::from_json(text) {
            Ok(message) => message,
            Err(e) => {
                let err = AppError::ConnectionFailure(format!("malformed frame: {e}"));
                warn!(
                    connection_id = %self.connection_id,
                    error = %err,
                    "Closing connection"
                );
                ctx.close(Some((ws::CloseCode::Invalid, "malformed frame").into()));
                ctx.stop();
                return;
            }
        };

        match protocol::handle_message(self.hub.service(), message) {
            Ok(Some(reply)) => match reply.to_json() {
                Ok(json) => ctx.text(json),
                Err(e) => warn!(error = %e, "Failed to serialize reply"),
            },
            Ok(None) => {}
            Err(e) => {
                warn!(
                    connection_id = %self.connection_id,
                    error = %e,
                    "Failed to handle frame"
                );
            }
        }
    }
}

impl Actor for NotificationSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(connection_id = %self.connection_id, "WebSocket connection established");

        if let Some(outbound) = self.outbound.take() {
            ctx.add_stream(ReceiverStream::new(outbound));
        }
        self.heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!(connection_id = %self.connection_id, "WebSocket connection closed");

        let hub = self.hub.clone();
        let connection_id = self.connection_id;
        actix::spawn(async move {
            hub.registry().unregister(connection_id).await;
        });
    }
}

/// Frames queued by the registry
impl StreamHandler<String> for NotificationSession {
    fn handle(&mut self, frame: String, ctx: &mut Self::Context) {
        ctx.text(frame);
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        // The registry released our queue: we were dropped as dead or stalled.
        debug!(connection_id = %self.connection_id, "Outbound queue closed");
        ctx.stop();
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for NotificationSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                self.last_seen = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Ping(msg)) => {
                self.last_seen = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_seen = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                debug!(connection_id = %self.connection_id, ?reason, "Close frame received");
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Binary(_)) | Ok(ws::Message::Continuation(_)) => {
                warn!(
                    connection_id = %self.connection_id,
                    "Unsupported frame kind, closing connection"
                );
                ctx.close(Some(ws::CloseCode::Unsupported.into()));
                ctx.stop();
            }
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                let err = AppError::ConnectionFailure(e.to_string());
                warn!(connection_id = %self.connection_id, error = %err, "Closing connection");
                ctx.stop();
            }
        }
    }
}
