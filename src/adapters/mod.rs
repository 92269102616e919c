//! Adapters: external integrations and HTTP handlers

pub mod api_handler;
pub mod health_handler;
pub mod jira_client;
pub mod jira_gateway;
pub mod tool_handler;
