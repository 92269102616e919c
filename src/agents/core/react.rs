//! ReAct agent: a bounded reasoning + acting loop with tool calling
//!
//! One `execute` call is one agent run: a single logical thread of control
//! that alternates between asking the model to decide (the only suspension
//! point per iteration) and executing the chosen tool. The scratchpad of
//! (invocation, result) pairs grows monotonically and is never rewritten;
//! the loop never rewinds or re-executes an observed tool call.

use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, error, warn};

use crate::agents::domain::{
    AgentResponse, Message, ToolCall, ToolCallResult, ToolDefinition,
};
use crate::agents::error::{AgentResult, LlmError};
use crate::agents::llm::{CompletionRequest, LlmProvider};
use crate::config::{AgentRunSettings, EarlyStoppingMethod};
use crate::domain::ToolPort;

/// What the model's reply resolved to for one iteration.
enum Decision {
    Final(String),
    Act(String, ToolCall),
    Malformed(String),
}

pub struct ReActAgent {
    settings: AgentRunSettings,
    system_prompt: String,
    llm: Arc<dyn LlmProvider>,
    tools: Arc<dyn ToolPort>,
}

impl ReActAgent {
    pub fn new(
        settings: AgentRunSettings,
        system_prompt: impl Into<String>,
        llm: Arc<dyn LlmProvider>,
        tools: Arc<dyn ToolPort>,
    ) -> Self {
        Self {
            settings,
            system_prompt: system_prompt.into(),
            llm,
            tools,
        }
    }

    /// Resolve one free-text request into a final answer.
    ///
    /// Every failure mode degrades into an answer string: remote failures,
    /// failing tools, unparseable model output and budget exhaustion all
    /// terminate the loop with some best-effort output. The error type in
    /// the signature is never produced by this implementation; it exists
    /// for the port boundary.
    pub async fn execute(&self, input: &str) -> AgentResult<AgentResponse> {
        let tool_definitions = self.build_tool_definitions().await;

        let mut messages = vec![
            Message::system(&self.system_prompt),
            Message::user(input),
        ];
        let mut scratchpad: Vec<ToolCallResult> = Vec::new();
        let mut iterations = 0;
        // set when the previous iteration already re-prompted for the same
        // malformed reply; a second miss in a row is terminal
        let mut reprompted = false;

        let mut final_output: Option<String> = None;

        for iteration in 0..self.settings.max_iterations {
            iterations = iteration + 1;

            let request = CompletionRequest {
                messages: messages.clone(),
                tools: if tool_definitions.is_empty() {
                    None
                } else {
                    Some(tool_definitions.clone())
                },
                ..Default::default()
            };

            let response = match self.llm.complete(request).await {
                Ok(response) => response,
                Err(LlmError::Parse(reason)) => {
                    // unparseable model output is recoverable, not fatal
                    match self.handle_malformed(&reason, &mut messages, &mut reprompted) {
                        Some(terminal) => {
                            final_output = Some(terminal);
                            break;
                        }
                        None => continue,
                    }
                }
                Err(e) => {
                    error!(error = %e, iteration, "model call failed");
                    final_output = Some(format!("Agent error: {e}"));
                    break;
                }
            };

            match Self::decide(response.message) {
                Decision::Final(answer) => {
                    final_output = Some(answer);
                    break;
                }
                Decision::Malformed(reason) => {
                    match self.handle_malformed(&reason, &mut messages, &mut reprompted) {
                        Some(terminal) => {
                            final_output = Some(terminal);
                            break;
                        }
                        None => continue,
                    }
                }
                Decision::Act(content, call) => {
                    reprompted = false;
                    if self.settings.verbose {
                        debug!(tool = %call.name, args = %call.arguments, iteration, "executing tool");
                    }

                    messages.push(Message::assistant_with_tools(&content, vec![call.clone()]));

                    let started = Instant::now();
                    let result = self
                        .tools
                        .execute_tool(&call.name, call.arguments.clone())
                        .await;
                    let elapsed_ms = started.elapsed().as_millis() as u64;

                    let observation = match result {
                        Ok(output) => ToolCallResult::success(
                            call.id.clone(),
                            call.name.clone(),
                            call.arguments.clone(),
                            output,
                            elapsed_ms,
                        ),
                        Err(e) => {
                            // a failing tool never kills the run; the error
                            // becomes an observation the model can react to
                            warn!(tool = %call.name, error = %e, "tool execution failed");
                            ToolCallResult::failure(
                                call.id.clone(),
                                call.name.clone(),
                                call.arguments.clone(),
                                e.to_string(),
                                elapsed_ms,
                            )
                        }
                    };

                    let feedback = if observation.success {
                        observation.output.clone()
                    } else {
                        json!({ "error": observation.error })
                    };
                    messages.push(Message::tool_result(&call.id, &feedback));
                    scratchpad.push(observation);
                }
            }
        }

        let output = match final_output {
            Some(output) => output,
            None => self.early_stop(&messages, &scratchpad).await,
        };

        Ok(AgentResponse {
            output,
            iterations,
            tool_calls: scratchpad,
        })
    }

    /// Interpret one model reply as a final answer or exactly one tool
    /// invocation. If the model emits several calls, the first wins.
    fn decide(message: Message) -> Decision {
        let content = message.content;
        match message.tool_calls {
            Some(mut calls) if !calls.is_empty() => {
                if calls.len() > 1 {
                    debug!(
                        dropped = calls.len() - 1,
                        "model returned multiple tool calls; keeping the first"
                    );
                }
                Decision::Act(content, calls.remove(0))
            }
            _ if !content.trim().is_empty() => Decision::Final(content),
            _ => Decision::Malformed("reply carried neither text nor a tool call".to_string()),
        }
    }

    /// Handle unparseable model output. Returns a terminal message when the
    /// loop should stop, `None` when a corrective re-prompt was queued.
    fn handle_malformed(
        &self,
        reason: &str,
        messages: &mut Vec<Message>,
        reprompted: &mut bool,
    ) -> Option<String> {
        if !self.settings.handle_parsing_errors {
            warn!(%reason, "unparseable model output, terminating");
            return Some(format!("Agent stopped: could not parse model output ({reason})"));
        }
        if *reprompted {
            warn!(%reason, "model output unparseable twice in a row, terminating");
            return Some(format!("Agent stopped: could not parse model output ({reason})"));
        }

        warn!(%reason, "unparseable model output, re-prompting once");
        *reprompted = true;
        messages.push(Message::user(
            "Your previous reply could not be parsed. Respond with either a single \
             tool call or a plain-text final answer.",
        ));
        None
    }

    /// Conclude a run whose iteration budget ran out without a final answer.
    async fn early_stop(&self, messages: &[Message], scratchpad: &[ToolCallResult]) -> String {
        match self.settings.early_stopping_method {
            EarlyStoppingMethod::Generate => {
                // one more tool-free call over the scratchpad so far
                let mut closing = messages.to_vec();
                closing.push(Message::user(
                    "Stop using tools now. Give your best final answer based on the \
                     information gathered so far.",
                ));
                let request = CompletionRequest {
                    messages: closing,
                    ..Default::default()
                };
                match self.llm.complete(request).await {
                    Ok(response) if !response.message.content.trim().is_empty() => {
                        response.message.content
                    }
                    Ok(_) => self.forced_answer(scratchpad),
                    Err(e) => {
                        error!(error = %e, "early-stopping generation failed");
                        self.forced_answer(scratchpad)
                    }
                }
            }
            EarlyStoppingMethod::Force => self.forced_answer(scratchpad),
        }
    }

    /// Fixed best-effort message assembled from the last observation.
    fn forced_answer(&self, scratchpad: &[ToolCallResult]) -> String {
        match scratchpad.last() {
            Some(last) => format!(
                "Agent stopped after {} iterations. Last observation from {}: {}",
                self.settings.max_iterations, last.tool_name, last.output
            ),
            None => format!(
                "Agent stopped after {} iterations without producing an answer.",
                self.settings.max_iterations
            ),
        }
    }

    async fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        match self.tools.list_tools().await {
            Ok(tools) => tools
                .into_iter()
                .map(|t| ToolDefinition {
                    name: t.name,
                    description: t.description,
                    parameters: t.input_schema,
                })
                .collect(),
            Err(e) => {
                error!(error = %e, "failed to list tools");
                Vec::new()
            }
        }
    }
}
