//! Concurrent related-ticket linking

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::adapters::jira_gateway::JiraGateway;
use crate::agents::extract::extract_tag;
use crate::agents::llm::{LlmProvider, LlmTask};
use crate::agents::prompts::{TICKET_LINKING_EXAMPLES, TICKET_LINKING_SYSTEM_PROMPT};
use crate::domain::Ticket;

/// Outcome of one candidate-pair evaluation.
#[derive(Debug, Clone)]
pub struct LinkDecision {
    pub source_key: String,
    pub target_key: String,
    pub linked: bool,
}

/// Compares a primary ticket against a corpus and links the matches.
///
/// Each comparison is an independent model call, so candidates are
/// evaluated concurrently, bounded by the host's available parallelism.
/// Link side effects happen in completion order; a duplicate link is a
/// tolerable no-op failure at the gateway.
pub struct RelationLinker {
    gateway: Arc<JiraGateway>,
    task: LlmTask,
    concurrency: usize,
}

impl RelationLinker {
    pub fn new(gateway: Arc<JiraGateway>, provider: Arc<dyn LlmProvider>) -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            gateway,
            task: LlmTask::new(TICKET_LINKING_SYSTEM_PROMPT, TICKET_LINKING_EXAMPLES, provider),
            concurrency,
        }
    }

    /// Evaluate every corpus ticket against `primary` and link the related
    /// ones. All evaluations are joined before this returns; the primary
    /// ticket is never compared against itself.
    pub async fn link_related(&self, primary: &Ticket, corpus: &HashMap<String, String>) {
        let primary_body = primary.body();
        let primary_key = primary.key.clone();

        let candidates: Vec<(String, String)> = corpus
            .iter()
            .filter(|(key, _)| key.as_str() != primary.key)
            .map(|(key, body)| (key.clone(), body.clone()))
            .collect();

        let decisions: Vec<LinkDecision> = stream::iter(candidates)
        .map(|(key, body)| {
            let primary_body = primary_body.clone();
            let primary_key = primary_key.clone();
            let key = key.clone();
            let body = body.clone();
            let gateway = self.gateway.clone();
            let task = self.task.clone();
            async move {
                debug!(candidate = %key, primary = %primary_key, "checking ticket match");
                let related = Self::is_related(&task, &primary_body, &body).await;
                let linked = if related {
                    info!(candidate = %key, primary = %primary_key, "found matching issues");
                    gateway.link_issues(&primary_key, &key).await
                } else {
                    false
                };
                LinkDecision {
                    source_key: primary_key.clone(),
                    target_key: key.clone(),
                    linked,
                }
            }
        })
        .buffer_unordered(self.concurrency)
        .collect()
        .await;

        let linked = decisions.iter().filter(|d| d.linked).count();
        debug!(
            linked,
            evaluated = decisions.len(),
            primary = %primary.key,
            "finished linking pass"
        );
    }

    /// Ask the model whether two ticket bodies describe related work.
    /// Related only if the extracted result is the exact literal "True".
    async fn is_related(task: &LlmTask, ticket1: &str, ticket2: &str) -> bool {
        let input = format!("<ticket1>{ticket1}</ticket1><ticket2>{ticket2}</ticket2>");
        match task.run(&input).await {
            Ok(text) => extract_tag(&text, None).as_deref() == Some("True"),
            Err(e) => {
                warn!(error = %e, "relatedness check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::jira_gateway::tests::MockJira;
    use crate::agents::domain::Message;
    use crate::agents::llm::{CompletionRequest, CompletionResponse, FinishReason};
    use crate::agents::error::LlmResult;
    use async_trait::async_trait;

    /// Provider that answers "True" iff both bodies mention a keyword.
    struct KeywordProvider {
        keyword: &'static str,
    }

    #[async_trait]
    impl LlmProvider for KeywordProvider {
        fn name(&self) -> &str {
            "keyword"
        }
        fn model(&self) -> &str {
            "test"
        }
        async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
            let input = &request.messages.last().unwrap().content;
            let ticket1 = extract_tag(input, Some("ticket1")).unwrap_or_default();
            let ticket2 = extract_tag(input, Some("ticket2")).unwrap_or_default();
            let related = ticket1.contains(self.keyword) && ticket2.contains(self.keyword);
            let answer = if related {
                "<result>True</result>"
            } else {
                "<result>False</result>"
            };
            Ok(CompletionResponse {
                message: Message::assistant(answer),
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn primary() -> Ticket {
        Ticket {
            key: "KA-01-5".to_string(),
            summary: "Implement user authentication".to_string(),
            description: "Add OAuth2 login and registration".to_string(),
        }
    }

    #[tokio::test]
    async fn links_related_tickets_once() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let gateway = Arc::new(JiraGateway::new(api.clone(), "KA-01"));
        let linker = RelationLinker::new(gateway, Arc::new(KeywordProvider { keyword: "OAuth2" }));

        let corpus = HashMap::from([
            (
                "KA-01-5".to_string(),
                "Implement user authentication\nAdd OAuth2 login and registration".to_string(),
            ),
            (
                "KA-01-9".to_string(),
                "Add OAuth2 support\nImplement OAuth2 authentication flow".to_string(),
            ),
            (
                "KA-01-2".to_string(),
                "Fix CSS bug in header\nHeader alignment broken".to_string(),
            ),
        ]);

        linker.link_related(&primary(), &corpus).await;

        let links = api.links.lock().unwrap();
        assert_eq!(
            links.as_slice(),
            [("KA-01-5".to_string(), "KA-01-9".to_string())]
        );
    }

    #[tokio::test]
    async fn never_links_primary_to_itself() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let gateway = Arc::new(JiraGateway::new(api.clone(), "KA-01"));
        // always-related provider: every candidate pair matches
        let linker = RelationLinker::new(gateway, Arc::new(KeywordProvider { keyword: "" }));

        let corpus = HashMap::from([
            ("KA-01-5".to_string(), "same ticket".to_string()),
            ("KA-01-9".to_string(), "other ticket".to_string()),
        ]);

        linker.link_related(&primary(), &corpus).await;

        let links = api.links.lock().unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.iter().all(|(_, target)| target != "KA-01-5"));
    }

    #[tokio::test]
    async fn provider_failure_links_nothing() {
        struct BrokenProvider;

        #[async_trait]
        impl LlmProvider for BrokenProvider {
            fn name(&self) -> &str {
                "broken"
            }
            fn model(&self) -> &str {
                "test"
            }
            async fn complete(
                &self,
                _request: CompletionRequest,
            ) -> LlmResult<CompletionResponse> {
                Err(crate::agents::error::LlmError::Timeout)
            }
        }

        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let gateway = Arc::new(JiraGateway::new(api.clone(), "KA-01"));
        let linker = RelationLinker::new(gateway, Arc::new(BrokenProvider));

        let corpus = HashMap::from([("KA-01-9".to_string(), "anything".to_string())]);
        linker.link_related(&primary(), &corpus).await;

        assert!(api.links.lock().unwrap().is_empty());
    }
}
