//! Error types for the persistence layer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Failed to connect to the database
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration failure
    #[error("Migration error: {0}")]
    Migration(String),

    /// Query execution failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
