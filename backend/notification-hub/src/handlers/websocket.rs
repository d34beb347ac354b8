/// WebSocket upgrade and connection status handlers
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use actix_web_actors::ws;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::hub::NotificationHub;
use crate::websocket::NotificationSession;

/// Upgrade to a live notification connection
///
/// Endpoint: GET /ws
///
/// The connection is registered before the handshake completes, so a
/// notification published while the upgrade is in flight is already queued
/// for it.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    hub: web::Data<Arc<NotificationHub>>,
) -> ActixResult<HttpResponse> {
    let hub = hub.get_ref().clone();
    let (connection_id, outbound) = hub.registry().register().await;
    let session = NotificationSession::new(connection_id, hub.clone(), outbound);

    match ws::start(session, &req, stream) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "WebSocket upgrade failed");
            hub.registry().unregister(connection_id).await;
            Err(e)
        }
    }
}

/// Live connection count and ids
///
/// Endpoint: GET /ws/status
pub async fn ws_status(hub: web::Data<Arc<NotificationHub>>) -> HttpResponse {
    let connection_ids: Vec<String> = hub
        .registry()
        .connection_ids()
        .await
        .iter()
        .map(ToString::to_string)
        .collect();

    HttpResponse::Ok().json(json!({
        "live_connections": connection_ids.len(),
        "connection_ids": connection_ids,
        "stored_notifications": hub.service().count(),
    }))
}

/// Register WebSocket routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(ws_connect))
        .route("/ws/status", web::get().to(ws_status));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebSocketConfig;
    use crate::services::InMemoryNotificationStore;
    use actix_web::{test, App};

    fn hub() -> Arc<NotificationHub> {
        Arc::new(NotificationHub::new(
            Arc::new(InMemoryNotificationStore::new()),
            WebSocketConfig::default(),
        ))
    }

    #[actix_rt::test]
    async fn test_plain_get_is_not_upgraded_and_leaves_no_registration() {
        let hub = hub();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(hub.clone()))
                .configure(register_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/ws").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_client_error());
        assert_eq!(hub.registry().connection_count().await, 0);
    }

    #[actix_rt::test]
    async fn test_ws_status() {
        let hub = hub();
        let (id, _rx) = hub.registry().register().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(hub.clone()))
                .configure(register_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/ws/status").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["live_connections"], json!(1));
        assert_eq!(body["connection_ids"], json!([id.to_string()]));
        assert_eq!(body["stored_notifications"], json!(0));
    }
}
