//! Repository for the agent request log

use async_trait::async_trait;
use sqlx::Row;

use crate::persistence::error::PersistenceError;
use crate::persistence::models::JiraRequestRecord;
use crate::persistence::pool::ConnectionPool;

/// Append-only log of request/response pairs.
#[async_trait]
pub trait RequestLogRepository: Send + Sync {
    /// Durably store one request/response pair.
    async fn insert(
        &self,
        request: &str,
        response: &str,
    ) -> Result<JiraRequestRecord, PersistenceError>;

    /// All records, oldest first.
    async fn list_all(&self) -> Result<Vec<JiraRequestRecord>, PersistenceError>;
}

/// SQLx-based implementation of RequestLogRepository
pub struct SqlxRequestLogRepository {
    pool: ConnectionPool,
}

impl SqlxRequestLogRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestLogRepository for SqlxRequestLogRepository {
    async fn insert(
        &self,
        request: &str,
        response: &str,
    ) -> Result<JiraRequestRecord, PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();

        let row = sqlx::query(
            "INSERT INTO jira_requests (request, response, created_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(request)
        .bind(response)
        .bind(&now)
        .fetch_one(self.pool.pool())
        .await?;

        let id: i64 = row.try_get("id")?;

        Ok(JiraRequestRecord {
            id,
            request: request.to_string(),
            response: response.to_string(),
            created_at: now,
            updated_at: None,
        })
    }

    async fn list_all(&self) -> Result<Vec<JiraRequestRecord>, PersistenceError> {
        let rows = sqlx::query(
            "SELECT id, request, response, created_at, updated_at FROM jira_requests ORDER BY id",
        )
        .fetch_all(self.pool.pool())
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(JiraRequestRecord {
                id: row.try_get("id")?,
                request: row.try_get("request")?,
                response: row.try_get("response")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            });
        }

        Ok(records)
    }
}
