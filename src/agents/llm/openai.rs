//! OpenAI-compatible chat-completions provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};
use crate::agents::domain::{Message, Role, ToolCall};
use crate::agents::error::{LlmError, LlmResult};
use crate::config::LlmSettings;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// OpenAI (or OpenAI-compatible endpoint) LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

impl OpenAiProvider {
    /// Create a new provider from settings. The API key is read from the
    /// environment variable named by `api_key_env`.
    pub fn new(settings: &LlmSettings) -> LlmResult<Self> {
        let api_key = env::var(&settings.api_key_env).map_err(|_| {
            LlmError::Authentication(format!(
                "Environment variable {} not set",
                settings.api_key_env
            ))
        })?;

        let base_url = settings
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            top_p: settings.top_p,
            frequency_penalty: settings.frequency_penalty,
            presence_penalty: settings.presence_penalty,
        })
    }

    /// Build the chat-completions request body
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": Self::convert_messages(&request.messages),
            "temperature": request.temperature.unwrap_or(self.temperature),
            "top_p": self.top_p,
            "frequency_penalty": self.frequency_penalty,
            "presence_penalty": self.presence_penalty,
        });

        if let Some(max_tokens) = request.max_tokens.or(self.max_tokens) {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(tools) = &request.tools {
            if !tools.is_empty() {
                body["tools"] = json!(tools
                    .iter()
                    .map(|t| {
                        json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect::<Vec<_>>());
            }
        }

        body
    }

    /// Convert internal messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<Value> {
        messages
            .iter()
            .map(|m| {
                let mut msg = json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                        Role::Tool => "tool",
                    },
                    "content": m.content,
                });

                if let Some(tool_calls) = &m.tool_calls {
                    msg["tool_calls"] = json!(tool_calls
                        .iter()
                        .map(|tc| {
                            json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    "arguments": serde_json::to_string(&tc.arguments)
                                        .unwrap_or_default(),
                                }
                            })
                        })
                        .collect::<Vec<_>>());
                }

                if let Some(tool_call_id) = &m.tool_call_id {
                    msg["tool_call_id"] = json!(tool_call_id);
                }

                msg
            })
            .collect()
    }

    fn parse_response(body: ChatCompletionDto) -> LlmResult<CompletionResponse> {
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse("completion contained no choices".to_string()))?;

        let content = choice.message.content.unwrap_or_default();

        let tool_calls = match choice.message.tool_calls {
            Some(calls) => {
                let mut parsed = Vec::with_capacity(calls.len());
                for call in calls {
                    let arguments: Value =
                        serde_json::from_str(&call.function.arguments).map_err(|e| {
                            LlmError::Parse(format!(
                                "tool call arguments for {} are not valid JSON: {}",
                                call.function.name, e
                            ))
                        })?;
                    parsed.push(ToolCall::new(call.id, call.function.name, arguments));
                }
                Some(parsed)
            }
            None => None,
        };

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("length") => FinishReason::Length,
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        Ok(CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content,
                tool_calls: tool_calls.filter(|c| !c.is_empty()),
                tool_call_id: None,
            },
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication(message),
                429 => LlmError::RateLimited,
                code => LlmError::Api { status: code, message },
            });
        }

        let dto: ChatCompletionDto = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Self::parse_response(dto)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionDto {
    choices: Vec<ChoiceDto>,
}

#[derive(Debug, Deserialize)]
struct ChoiceDto {
    message: ChoiceMessageDto,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessageDto {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDto>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDto {
    id: String,
    function: FunctionDto,
}

#[derive(Debug, Deserialize)]
struct FunctionDto {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: Value) -> LlmResult<CompletionResponse> {
        let dto: ChatCompletionDto = serde_json::from_value(json).unwrap();
        OpenAiProvider::parse_response(dto)
    }

    #[test]
    fn parses_final_answer() {
        let response = parse(json!({
            "choices": [{
                "message": { "content": "There are 4 tasks in DONE." },
                "finish_reason": "stop"
            }]
        }))
        .unwrap();

        assert_eq!(response.message.content, "There are 4 tasks in DONE.");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert!(response.message.tool_calls.is_none());
    }

    #[test]
    fn parses_tool_call() {
        let response = parse(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "search_tickets",
                            "arguments": "{\"jql\": \"status = DONE\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        assert_eq!(response.finish_reason, FinishReason::ToolCalls);
        let calls = response.message.tool_calls.unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "search_tickets");
        assert_eq!(calls[0].arguments["jql"], "status = DONE");
    }

    #[test]
    fn invalid_tool_arguments_are_a_parse_error() {
        let result = parse(json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "search_tickets", "arguments": "{not json" }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }));

        assert!(matches!(result, Err(LlmError::Parse(_))));
    }

    #[test]
    fn empty_choices_are_a_parse_error() {
        let result = parse(json!({ "choices": [] }));
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }
}
