/// HTTP handlers for the notification hub API
pub mod notifications;
pub mod websocket;

use actix_web::web;

pub use notifications::register_routes as register_notifications;
pub use websocket::register_routes as register_websocket;

/// Mount every gateway route plus `/metrics`
pub fn configure(cfg: &mut web::ServiceConfig) {
    register_notifications(cfg);
    register_websocket(cfg);
    cfg.route("/metrics", web::get().to(crate::metrics::serve_metrics));
}
