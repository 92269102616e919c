//! Database models for the persistence layer

use serde::{Deserialize, Serialize};

/// One persisted agent request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraRequestRecord {
    /// Auto-incrementing identifier
    pub id: i64,
    /// The user's request text
    pub request: String,
    /// The agent's final answer
    pub response: String,
    /// Creation timestamp (ISO8601)
    pub created_at: String,
    /// Last update timestamp (ISO8601), None if never updated
    pub updated_at: Option<String>,
}
