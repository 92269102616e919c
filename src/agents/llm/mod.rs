//! LLM provider interface
//!
//! One provider implementation ships: an OpenAI-compatible chat-completions
//! client. Everything above it depends on the `LlmProvider` trait, so tests
//! substitute scripted providers.

mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agents::domain::{Message, ToolDefinition};
use crate::agents::error::LlmResult;

/// Trait for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;

    /// Complete a request. The single blocking round-trip per call; no
    /// streaming.
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;
}

/// Request for LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Messages in the conversation
    pub messages: Vec<Message>,
    /// Temperature override for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Tools available for calling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            tools: None,
        }
    }
}

/// Response from LLM completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message
    pub message: Message,
    /// Reason the completion stopped
    pub finish_reason: FinishReason,
}

/// Reason completion stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop
    Stop,
    /// Hit max tokens
    Length,
    /// Tool call requested
    ToolCalls,
    /// Content filtered
    ContentFilter,
}

/// One worked input/output pair shown to the model before the real input.
#[derive(Debug, Clone, Copy)]
pub struct FewShotExample {
    pub input: &'static str,
    pub output: &'static str,
}

/// A fixed prompt task: system prompt plus few-shot examples, run against
/// a provider with a single user input. Used by the linking and analysis
/// calls, which never use tools.
#[derive(Clone)]
pub struct LlmTask {
    system_prompt: String,
    examples: Vec<FewShotExample>,
    provider: Arc<dyn LlmProvider>,
}

impl LlmTask {
    pub fn new(
        system_prompt: impl Into<String>,
        examples: &[FewShotExample],
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            examples: examples.to_vec(),
            provider,
        }
    }

    /// Run the task with the given input and return the raw model text.
    pub async fn run(&self, input: &str) -> LlmResult<String> {
        let mut messages = Vec::with_capacity(self.examples.len() * 2 + 2);
        messages.push(Message::system(&self.system_prompt));
        for example in &self.examples {
            messages.push(Message::user(example.input));
            messages.push(Message::assistant(example.output));
        }
        messages.push(Message::user(input));

        let response = self
            .provider
            .complete(CompletionRequest {
                messages,
                ..Default::default()
            })
            .await?;

        Ok(response.message.content)
    }
}
