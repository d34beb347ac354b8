pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod metrics;
pub mod models;
pub mod services;
pub mod websocket;

pub use config::Config;
pub use error::{AppError, Result};
pub use hub::NotificationHub;
pub use services::*;
pub use websocket::{ConnectionRegistry, NotificationSession};
