use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use notification_hub::{
    handlers, metrics, Config, InMemoryNotificationStore, NotificationHub, NotificationStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing();

    tracing::info!(env = %config.app.env, "Starting notification hub");

    let store: Arc<dyn NotificationStore> = Arc::new(InMemoryNotificationStore::new());
    let hub = Arc::new(NotificationHub::new(store, config.websocket.clone()));

    if config.app.seed_welcome {
        hub.service()
            .create("Notification hub", "Server started and ready for notifications")
            .context("failed to seed welcome notification")?;
    }

    let addr = config.bind_addr();
    tracing::info!("Starting HTTP server on {}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(hub.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(metrics::MetricsMiddleware)
            .configure(handlers::configure)
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {addr}"))?
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("Notification hub stopped");
    Ok(())
}
