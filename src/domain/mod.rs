//! Core domain types and port traits
//!
//! Ports follow the hexagonal layout: adapters implement these traits,
//! everything above depends only on the trait objects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Jira issue, identified by its project-scoped key.
///
/// Tickets are read-only snapshots; mutations (linking, commenting) are
/// remote side effects recorded as booleans at the call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    pub summary: String,
    pub description: String,
}

impl Ticket {
    /// Summary and description joined the way the triage prompts expect.
    pub fn body(&self) -> String {
        format!("{}\n{}", self.summary, self.description)
    }
}

/// A Jira project as returned by the projects listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// Definition of a tool exposed to the agent loop.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Raw Jira REST operations.
///
/// Implementations may fail; the fail-soft policy lives one level up in
/// `JiraGateway`, which is the only caller of this port.
#[async_trait]
pub trait JiraApi: Send + Sync {
    async fn projects(&self) -> anyhow::Result<Vec<Project>>;
    async fn search(&self, jql: &str) -> anyhow::Result<Vec<Ticket>>;
    async fn issue(&self, key: &str) -> anyhow::Result<Ticket>;
    async fn create_issue_link(
        &self,
        link_type: &str,
        inward: &str,
        outward: &str,
    ) -> anyhow::Result<()>;
    async fn add_comment(&self, key: &str, body: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ToolPort: Send + Sync {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value>;
    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>>;
}
