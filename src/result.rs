//! Result types for agent execution

use crate::items::{Message, ToolCallResult};
use crate::usage::Usage;

/// The result of running an agent.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Text of the concluding response; empty when the model sent none
    pub final_output: String,
    /// Conversation as last sent to the model, followed by its answer
    pub messages: Vec<Message>,
    /// One entry per dispatched tool call, in request order
    pub tool_results: Vec<ToolCallResult>,
    /// Summed over every completion request of the run
    pub usage: Usage,
    /// Completion requests issued; 1 or 2
    pub api_calls: usize,
}

impl RunResult {
    /// Whether a finalization round trip was needed.
    pub fn used_tools(&self) -> bool {
        self.api_calls > 1
    }

    /// Tool results whose payload is an error object.
    pub fn failed_tool_calls(&self) -> impl Iterator<Item = &ToolCallResult> {
        self.tool_results.iter().filter(|r| r.is_error())
    }
}
