//! Items exchanged with the completion API
//!
//! Messages, tool-call requests, model requests/responses and the per-call
//! results produced while dispatching tools. These are provider-neutral;
//! `model.rs` maps them onto the OpenAI wire types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::tool::{ToolOutput, ToolSpec};
use crate::usage::Usage;

/// Role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRequest>>,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            tool_call_id: None,
            tool_calls: None,
        }
    }

    pub fn assistant_with_tool_calls(
        content: Option<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_call_id: None,
            tool_calls: Some(tool_calls),
        }
    }

    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: None,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls
            .as_ref()
            .is_some_and(|calls| !calls.is_empty())
    }

    /// Text content, or the empty string when the model sent none.
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Correlation id echoed back on the tool-result message
    pub id: String,
    /// Absent for non-function tool calls; such requests are skipped
    pub function: Option<FunctionCall>,
}

impl ToolCallRequest {
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            function: Some(FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            }),
        }
    }
}

/// Function name plus its JSON-encoded argument string, as sent by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Tool-choice policy sent alongside tool specifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    Auto,
    None,
    Required,
}

/// A single request to the completion API
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolSpec>>,
    pub tool_choice: Option<ToolChoice>,
}

impl ModelRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: None,
            tool_choice: None,
        }
    }

    /// Advertise tools with automatic choice; an empty list leaves both
    /// fields unset.
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        if tools.is_empty() {
            self.tools = None;
            self.tool_choice = None;
        } else {
            self.tools = Some(tools);
            self.tool_choice = Some(ToolChoice::Auto);
        }
        self
    }
}

/// One candidate completion
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// Response from the model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub id: String,
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl ModelResponse {
    pub fn new_message(content: impl Into<String>) -> Self {
        Self::from_message(Message::assistant(content), "stop")
    }

    /// A response whose primary message has null content.
    pub fn new_empty() -> Self {
        Self::from_message(
            Message {
                content: None,
                ..Message::assistant("")
            },
            "stop",
        )
    }

    pub fn new_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self::from_message(
            Message::assistant_with_tool_calls(None, tool_calls),
            "tool_calls",
        )
    }

    fn from_message(message: Message, finish_reason: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            choices: vec![Choice {
                message,
                finish_reason: Some(finish_reason.to_string()),
            }],
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Message of the first choice.
    pub fn primary_message(&self) -> Option<&Message> {
        self.choices.first().map(|choice| &choice.message)
    }
}

/// Output attached to one tool call
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCallOutput {
    Value(ToolOutput),
    Error(String),
}

/// Ephemeral result of dispatching one tool call during a run
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub call_id: String,
    pub tool_name: String,
    pub output: ToolCallOutput,
}

impl ToolCallResult {
    pub fn success(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: ToolOutput,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: ToolCallOutput::Value(output),
        }
    }

    pub fn error(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            output: ToolCallOutput::Error(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.output, ToolCallOutput::Error(_))
    }

    /// JSON text placed in the tool-result message.
    pub fn content(&self) -> String {
        match &self.output {
            ToolCallOutput::Value(output) => output.to_json_string(),
            ToolCallOutput::Error(message) => json!({ "error": message }).to_string(),
        }
    }

    pub fn to_message(&self) -> Message {
        Message::tool(self.content(), self.call_id.clone())
    }

    /// Parsed form of [`content`](Self::content).
    pub fn content_value(&self) -> Value {
        serde_json::from_str(&self.content()).unwrap_or(Value::Null)
    }
}
