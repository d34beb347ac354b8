pub mod notification_service;
pub mod notification_store;

pub use notification_service::*;
pub use notification_store::*;
