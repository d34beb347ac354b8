/// Notification REST handlers
use crate::error::AppError;
use crate::hub::NotificationHub;
use crate::models::{
    CreateNotificationRequest, HealthResponse, NotificationsResponse, SuccessResponse,
};
use actix_web::{web, HttpResponse};
use std::sync::Arc;

type HandlerResult = Result<HttpResponse, AppError>;

/// GET /api/health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: "Notification hub is running".to_string(),
    })
}

/// Create a notification and push it to live connections
///
/// POST /api/notifications
pub async fn create_notification(
    hub: web::Data<Arc<NotificationHub>>,
    req: web::Json<CreateNotificationRequest>,
) -> HandlerResult {
    let notification = hub.publish(&req.title, &req.message).await?;
    Ok(HttpResponse::Created().json(notification))
}

/// Unread notifications, newest first
///
/// GET /api/notifications
pub async fn list_unread(hub: web::Data<Arc<NotificationHub>>) -> HttpResponse {
    HttpResponse::Ok().json(NotificationsResponse {
        notifications: hub.service().list_unread(),
    })
}

/// Every notification including read ones (debugging)
///
/// GET /api/notifications/all
pub async fn list_all(hub: web::Data<Arc<NotificationHub>>) -> HttpResponse {
    HttpResponse::Ok().json(NotificationsResponse {
        notifications: hub.service().list_all(),
    })
}

/// PUT /api/notifications/{id}/read
pub async fn mark_as_read(
    hub: web::Data<Arc<NotificationHub>>,
    path: web::Path<String>,
) -> HandlerResult {
    hub.service().mark_read(&path.into_inner())?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}

/// DELETE /api/notifications
pub async fn clear_all(hub: web::Data<Arc<NotificationHub>>) -> HttpResponse {
    hub.service().clear_all();
    HttpResponse::Ok().json(SuccessResponse { success: true })
}

/// Register routes
pub fn register_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::InvalidArgument(err.to_string()).into()
            }))
            .route("/health", web::get().to(health))
            .route("/notifications", web::post().to(create_notification))
            .route("/notifications", web::get().to(list_unread))
            .route("/notifications", web::delete().to(clear_all))
            .route("/notifications/all", web::get().to(list_all))
            .route("/notifications/{id}/read", web::put().to(mark_as_read)),
    );
}
