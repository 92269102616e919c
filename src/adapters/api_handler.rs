//! REST API handlers
//!
//! Thin request/response mapping over the agent port, the request log and
//! the gateway. Error bodies are JSON; a run that produces no output is
//! reported distinctly from a failed run.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::adapters::jira_gateway::JiraGateway;
use crate::agents::domain::AgentPort;
use crate::persistence::{JiraRequestRecord, RequestLogRepository};

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<dyn AgentPort>,
    pub records: Arc<dyn RequestLogRepository>,
    pub gateway: Arc<JiraGateway>,
}

#[derive(Debug, Deserialize)]
pub struct JiraRequestBody {
    pub request: String,
}

#[derive(Debug, Serialize)]
pub struct JiraResponseBody {
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /api/jira/agent - run the agent on one request and persist the pair
pub async fn run_agent(
    State(state): State<ApiState>,
    Json(body): Json<JiraRequestBody>,
) -> Response {
    info!(request = %body.request, "processing Jira request");

    let response = match state.agent.execute(&body.request).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "agent execution failed");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    if response.output.trim().is_empty() {
        error!("agent produced no output");
        return error_response(StatusCode::BAD_GATEWAY, "No output from agent");
    }

    match state.records.insert(&body.request, &response.output).await {
        Ok(record) => {
            info!(id = record.id, "saved Jira request");
        }
        Err(e) => {
            error!(error = %e, "failed to persist request record");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    }

    (
        StatusCode::OK,
        Json(JiraResponseBody {
            output: response.output,
        }),
    )
        .into_response()
}

/// GET /api/jira/records - the full request log
pub async fn list_records(State(state): State<ApiState>) -> Response {
    match state.records.list_all().await {
        Ok(records) => {
            info!(count = records.len(), "fetched Jira records");
            (StatusCode::OK, Json::<Vec<JiraRequestRecord>>(records)).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to list records");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/jira/projects - all visible Jira projects
pub async fn list_projects(State(state): State<ApiState>) -> Response {
    let projects: HashMap<String, String> = state.gateway.list_projects().await;
    info!(count = projects.len(), "fetched Jira projects");
    (StatusCode::OK, Json(projects)).into_response()
}
