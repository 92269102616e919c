//! Agent handler implementing AgentPort

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::agents::core::ReActAgent;
use crate::agents::domain::{AgentPort, AgentResponse};
use crate::agents::llm::LlmProvider;
use crate::agents::prompts::JIRA_AGENT_SYSTEM_PROMPT;
use crate::config::AgentRunSettings;
use crate::domain::ToolPort;

/// Owns the configured Jira agent and exposes it through `AgentPort`.
///
/// Explicitly constructed at the composition root and shared across
/// requests; each `execute` call is an independent run with no shared
/// mutable state.
pub struct AgentHandler {
    agent: ReActAgent,
}

impl AgentHandler {
    pub fn new(
        settings: AgentRunSettings,
        llm: Arc<dyn LlmProvider>,
        tools: Arc<dyn ToolPort>,
    ) -> Self {
        Self {
            agent: ReActAgent::new(settings, JIRA_AGENT_SYSTEM_PROMPT, llm, tools),
        }
    }
}

#[async_trait]
impl AgentPort for AgentHandler {
    async fn execute(&self, input: &str) -> anyhow::Result<AgentResponse> {
        debug!("executing agent run");
        let response = self.agent.execute(input).await?;
        debug!(
            iterations = response.iterations,
            tool_calls = response.tool_calls.len(),
            "agent run finished"
        );
        Ok(response)
    }
}
