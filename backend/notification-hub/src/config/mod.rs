use crate::error::{AppError, Result};
use crate::websocket::registry::DEFAULT_SEND_QUEUE_CAPACITY;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub websocket: WebSocketConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
    /// Insert a startup notification so fresh clients see something
    pub seed_welcome: bool,
}

#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Frames a connection may have queued before it is dropped as stalled
    pub send_queue_capacity: usize,
    pub heartbeat_interval: Duration,
    /// Close a connection that has been silent for longer than this
    pub client_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
            heartbeat_interval: Duration::from_secs(5),
            client_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; missing keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = WebSocketConfig::default();

        let config = Config {
            app: AppConfig {
                env: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
                host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "APP_PORT", 8080)?,
                seed_welcome: parse_bool(&lookup, "SEED_WELCOME_NOTIFICATION")?,
            },
            websocket: WebSocketConfig {
                send_queue_capacity: parse_or(
                    &lookup,
                    "WS_SEND_QUEUE_CAPACITY",
                    defaults.send_queue_capacity,
                )?,
                heartbeat_interval: Duration::from_secs(parse_or(
                    &lookup,
                    "WS_HEARTBEAT_INTERVAL_SECS",
                    defaults.heartbeat_interval.as_secs(),
                )?),
                client_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "WS_CLIENT_TIMEOUT_SECS",
                    defaults.client_timeout.as_secs(),
                )?),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.websocket.send_queue_capacity == 0 {
            return Err(AppError::Config(
                "WS_SEND_QUEUE_CAPACITY must be greater than 0".into(),
            ));
        }
        if self.websocket.heartbeat_interval.is_zero() {
            return Err(AppError::Config(
                "WS_HEARTBEAT_INTERVAL_SECS must be greater than 0".into(),
            ));
        }
        if self.websocket.client_timeout <= self.websocket.heartbeat_interval {
            return Err(AppError::Config(
                "WS_CLIENT_TIMEOUT_SECS must exceed WS_HEARTBEAT_INTERVAL_SECS".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.app.host, self.app.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key}: {e}"))),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &str) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(AppError::Config(format!("{key}: expected a boolean, got {v:?}"))),
    }
}
