//! Agent response types

use serde::{Deserialize, Serialize};

use super::ToolCallResult;

/// The outcome of one agent run.
///
/// Carries the final answer plus the scratchpad trace: every tool call the
/// loop observed, in order. The run itself is discarded once this has been
/// handed to the caller; persistence is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Final answer text
    pub output: String,
    /// Number of loop iterations consumed
    pub iterations: u32,
    /// Ordered tool call trace (the scratchpad)
    pub tool_calls: Vec<ToolCallResult>,
}
