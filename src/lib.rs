//! # Themis - Jira Agent Service
//!
//! Themis turns natural-language requests into Jira operations through a
//! bounded tool-calling agent loop. A triage workflow (related-ticket
//! linking plus extracted planning metadata) is exposed as one of the
//! agent's tools; request/response pairs are persisted to a request log.
//!
//! ## Architecture
//!
//! Hexagonal layout:
//! - **Domain**: core types and port traits (`JiraApi`, `ToolPort`, `AgentPort`)
//! - **Agents**: the loop, triage workflow, LLM plumbing and prompts
//! - **Adapters**: Jira REST client, fail-soft gateway, tool registry, HTTP handlers
//! - **Persistence**: request log over sqlx
//! - **Config**: file + environment + CLI settings

pub mod adapters;
pub mod agents;
pub mod cli;
pub mod config;
pub mod domain;
pub mod persistence;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(api_state: ApiState, health_handler: Arc<HealthHandler>) -> Router {
    let health_router = Router::new()
        .route(
            "/health",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.health().await }
                }
            }),
        )
        .route(
            "/health/ready",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.ready().await }
                }
            }),
        )
        .route(
            "/health/live",
            get({
                let handler = health_handler.clone();
                move || {
                    let h = handler.clone();
                    async move { h.live().await }
                }
            }),
        );

    let api_router = Router::new()
        .route("/api/jira/agent", post(api_handler::run_agent))
        .route("/api/jira/records", get(api_handler::list_records))
        .route("/api/jira/projects", get(api_handler::list_projects))
        .with_state(api_state);

    health_router.merge(api_router).layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
