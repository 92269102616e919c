//! Domain types for the agent system

mod message;
mod response;
mod tool_call;

pub use message::*;
pub use response::*;
pub use tool_call::*;

use async_trait::async_trait;

/// Port trait for agent execution (follows the JiraApi/ToolPort pattern)
#[async_trait]
pub trait AgentPort: Send + Sync {
    /// Resolve one free-text request into a final answer.
    async fn execute(&self, input: &str) -> anyhow::Result<AgentResponse>;
}
