//! Triage metadata extraction from ticket descriptions

use std::sync::Arc;

use tracing::{debug, error};

use crate::agents::extract::extract_tag;
use crate::agents::llm::{LlmProvider, LlmTask};
use crate::agents::prompts::{TICKET_ANALYSIS_EXAMPLES, TICKET_ANALYSIS_SYSTEM_PROMPT};

/// Structured triage fields pulled out of one analysis call.
///
/// Any subset may be present; never persisted as structured data, only
/// serialized into a Jira comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriageMetadata {
    pub user_stories: Option<String>,
    pub acceptance_criteria: Option<String>,
    pub priority: Option<String>,
    pub thought: Option<String>,
}

impl TriageMetadata {
    pub fn is_empty(&self) -> bool {
        self.user_stories.is_none()
            && self.acceptance_criteria.is_none()
            && self.priority.is_none()
            && self.thought.is_none()
    }

    /// Serialize the present fields as "field: value" lines.
    pub fn to_comment(&self) -> String {
        let fields = [
            ("user_stories", &self.user_stories),
            ("acceptance_criteria", &self.acceptance_criteria),
            ("priority", &self.priority),
            ("thought", &self.thought),
        ];
        fields
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{name}: {v}")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Extracts triage metadata from a ticket description via one model call.
pub struct TicketAnalyzer {
    task: LlmTask,
}

impl TicketAnalyzer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            task: LlmTask::new(
                TICKET_ANALYSIS_SYSTEM_PROMPT,
                TICKET_ANALYSIS_EXAMPLES,
                provider,
            ),
        }
    }

    /// Analyze a ticket description. Returns `None` only when the model
    /// call fails or every field is absent; otherwise a record with
    /// whichever fields were present. Never partially fails.
    pub async fn analyze(&self, description: &str) -> Option<TriageMetadata> {
        debug!("analyzing ticket");
        let input = format!("<description>{description}</description>");
        let text = match self.task.run(&input).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "error analyzing ticket");
                return None;
            }
        };

        let metadata = TriageMetadata {
            user_stories: extract_tag(&text, Some("user_stories")),
            acceptance_criteria: extract_tag(&text, Some("acceptance_criteria")),
            priority: extract_tag(&text, Some("priority")),
            thought: extract_tag(&text, Some("thought")),
        };

        if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        }
    }
}
