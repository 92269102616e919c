use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::persistence::ConnectionPool;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub struct HealthHandler {
    pool: ConnectionPool,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if the server is running
    pub async fn health(&self) -> impl IntoResponse {
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        };
        (StatusCode::OK, Json(status))
    }

    /// Readiness check - verifies the database connection
    pub async fn ready(&self) -> impl IntoResponse {
        match self.pool.health_check().await {
            Ok(()) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "ready",
                    "message": "Server is ready to accept requests"
                })),
            ),
            Err(e) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "not_ready",
                    "message": e.to_string()
                })),
            ),
        }
    }

    /// Liveness check - returns 200 if the server is responsive
    pub async fn live(&self) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "alive",
                "message": "Server is alive"
            })),
        )
    }
}
