//! Persistence layer: request log storage over sqlx

pub mod error;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::PersistenceError;
pub use models::JiraRequestRecord;
pub use pool::ConnectionPool;
pub use repository::{RequestLogRepository, SqlxRequestLogRepository};
