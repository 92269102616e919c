//! Jira tool registry for the agent loop
//!
//! A closed registry: dispatch is a match on the tool name, never dynamic
//! lookup. Missing required arguments and unknown names are errors raised
//! to the Act step, where the loop converts them into error observations.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::adapters::jira_gateway::JiraGateway;
use crate::agents::triage::TriageEngine;
use crate::domain::{Tool, ToolPort};

pub struct JiraToolHandler {
    gateway: Arc<JiraGateway>,
    triage: Arc<TriageEngine>,
}

impl JiraToolHandler {
    pub fn new(gateway: Arc<JiraGateway>, triage: Arc<TriageEngine>) -> Self {
        Self { gateway, triage }
    }
}

fn required_str<'a>(args: &'a Value, key: &str) -> anyhow::Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing required argument: {key}"))
}

fn string_arg_schema(name: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            name: { "type": "string", "description": description }
        },
        "required": [name]
    })
}

#[async_trait]
impl ToolPort for JiraToolHandler {
    async fn execute_tool(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        match name {
            "get_projects" => Ok(json!(self.gateway.list_projects().await)),
            "get_all_tickets" => Ok(json!(self.gateway.all_tickets().await)),
            "search_tickets" => {
                let jql = required_str(&args, "jql")?;
                Ok(json!(self.gateway.search_issues(jql).await))
            }
            "get_ticket_data" => {
                let ticket_number = required_str(&args, "ticket_number")?;
                match self.gateway.get_issue(ticket_number).await {
                    Some(ticket) => Ok(json!(ticket)),
                    None => Ok(json!({
                        "found": false,
                        "message": format!("Could not find ticket {ticket_number}"),
                    })),
                }
            }
            "link_tickets" => {
                let from_issue = required_str(&args, "from_issue")?;
                let to_issue = required_str(&args, "to_issue")?;
                let linked = self.gateway.link_issues(from_issue, to_issue).await;
                Ok(json!({ "linked": linked }))
            }
            "add_comment" => {
                let issue_key = required_str(&args, "issue_key")?;
                let comment = required_str(&args, "comment")?;
                let commented = self.gateway.add_comment(issue_key, comment).await;
                Ok(json!({ "commented": commented }))
            }
            "triage_ticket" => {
                let ticket_number = required_str(&args, "ticket_number")?;
                Ok(json!(self.triage.triage(ticket_number).await))
            }
            _ => Err(anyhow::anyhow!("Tool not found: {name}")),
        }
    }

    async fn list_tools(&self) -> anyhow::Result<Vec<Tool>> {
        Ok(vec![
            Tool {
                name: "get_projects".to_string(),
                description: "List all available Jira projects as key -> name".to_string(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool {
                name: "get_all_tickets".to_string(),
                description: "Get every ticket in the configured project as key -> summary and description"
                    .to_string(),
                input_schema: json!({ "type": "object", "properties": {} }),
            },
            Tool {
                name: "search_tickets".to_string(),
                description: "Search tickets with a JQL query; the project filter is added automatically"
                    .to_string(),
                input_schema: string_arg_schema("jql", "JQL query, e.g. \"status = DONE\""),
            },
            Tool {
                name: "get_ticket_data".to_string(),
                description: "Get the summary and description of one ticket".to_string(),
                input_schema: string_arg_schema("ticket_number", "Ticket key, e.g. \"KA-01-5\""),
            },
            Tool {
                name: "link_tickets".to_string(),
                description: "Create a Relates link between two tickets".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "from_issue": { "type": "string", "description": "Source ticket key" },
                        "to_issue": { "type": "string", "description": "Target ticket key" }
                    },
                    "required": ["from_issue", "to_issue"]
                }),
            },
            Tool {
                name: "add_comment".to_string(),
                description: "Add a comment to a ticket".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "issue_key": { "type": "string", "description": "Ticket key" },
                        "comment": { "type": "string", "description": "Comment text" }
                    },
                    "required": ["issue_key", "comment"]
                }),
            },
            Tool {
                name: "triage_ticket".to_string(),
                description: "Analyze and triage a Jira ticket, linking related tickets and adding relevant metadata"
                    .to_string(),
                input_schema: string_arg_schema("ticket_number", "Ticket key to triage"),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::jira_gateway::tests::MockJira;
    use crate::agents::domain::Message;
    use crate::agents::error::LlmResult;
    use crate::agents::llm::{
        CompletionRequest, CompletionResponse, FinishReason, LlmProvider,
    };
    use crate::domain::Ticket;

    struct NeverRelatedProvider;

    #[async_trait]
    impl LlmProvider for NeverRelatedProvider {
        fn name(&self) -> &str {
            "never"
        }
        fn model(&self) -> &str {
            "test"
        }
        async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
            Ok(CompletionResponse {
                message: Message::assistant("<result>False</result>"),
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn handler(api: Arc<MockJira>) -> JiraToolHandler {
        let gateway = Arc::new(JiraGateway::new(api, "KA-01"));
        let triage = Arc::new(TriageEngine::new(
            gateway.clone(),
            Arc::new(NeverRelatedProvider),
        ));
        JiraToolHandler::new(gateway, triage)
    }

    #[tokio::test]
    async fn dispatches_search() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let handler = handler(api.clone());

        let result = handler
            .execute_tool("search_tickets", json!({ "jql": "status = DONE" }))
            .await
            .unwrap();
        assert!(result.is_object());

        let searches = api.searches.lock().unwrap();
        assert_eq!(searches.as_slice(), ["project = KA-01 AND status = DONE"]);
    }

    #[tokio::test]
    async fn missing_argument_is_an_error() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let handler = handler(api);

        let err = handler
            .execute_tool("search_tickets", json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Missing required argument: jql"));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let handler = handler(api);

        let err = handler.execute_tool("nonsense", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Tool not found"));
    }

    #[tokio::test]
    async fn get_ticket_data_reports_missing_tickets_softly() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let handler = handler(api);

        let result = handler
            .execute_tool("get_ticket_data", json!({ "ticket_number": "KA-99-1" }))
            .await
            .unwrap();
        assert_eq!(result["found"], false);
    }

    #[tokio::test]
    async fn triage_tool_returns_status_message() {
        let mut api = MockJira::with_project("KA-01", "Kanban Alpha");
        api.tickets = vec![Ticket {
            key: "KA-01-5".to_string(),
            summary: "a".to_string(),
            description: "b".to_string(),
        }];
        let handler = handler(Arc::new(api));

        let result = handler
            .execute_tool("triage_ticket", json!({ "ticket_number": "KA-01-5" }))
            .await
            .unwrap();
        assert_eq!(result, json!("Successfully triaged ticket KA-01-5"));
    }

    #[tokio::test]
    async fn lists_the_full_registry() {
        let api = Arc::new(MockJira::with_project("KA-01", "Kanban Alpha"));
        let handler = handler(api);

        let tools = handler.list_tools().await.unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "get_projects",
                "get_all_tickets",
                "search_tickets",
                "get_ticket_data",
                "link_tickets",
                "add_comment",
                "triage_ticket"
            ]
        );
    }
}
