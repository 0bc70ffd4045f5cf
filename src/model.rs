//! Model abstraction for LLM interactions
//!
//! [`ModelProvider`] is the seam between the runner and the completion API.
//! [`OpenAIProvider`] wraps the async-openai client; [`MockProvider`] replays
//! scripted responses and records every request it receives.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolChoiceOption,
        ChatCompletionToolType, CompletionUsage, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
        FunctionCall as OpenAIFunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::config::Credentials;
use crate::error::{AgentsError, Result};
use crate::items::{
    Choice, Message, ModelRequest, ModelResponse, Role, ToolCallRequest, ToolChoice,
};
use crate::tool::ToolSpec;
use crate::usage::Usage;

/// Trait for model providers
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one completion request
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse>;
}

/// OpenAI-compatible provider using async-openai
pub struct OpenAIProvider {
    client: Client<OpenAIConfig>,
}

impl std::fmt::Debug for OpenAIProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIProvider").finish_non_exhaustive()
    }
}

impl OpenAIProvider {
    /// Client bound to the given credentials and optional endpoint
    pub fn new(credentials: &Credentials) -> Self {
        let api_key = credentials.api_key.clone();
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = &credentials.base_url {
            config = config.with_api_base(base_url.clone());
        }
        Self {
            client: Client::with_config(config),
        }
    }

    /// Create with a custom client
    pub fn with_client(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse> {
        let request = to_openai_request(&request)?;
        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "sending chat completion"
        );
        let response = self.client.chat().create(request).await?;
        Ok(from_openai_response(response))
    }
}

fn convert_message(msg: &Message) -> Result<ChatCompletionRequestMessage> {
    let content = msg.content.clone().unwrap_or_default();
    let converted = match msg.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => {
            let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = &msg.content {
                builder.content(content.clone());
            }

            // Replayed verbatim; non-function calls were never forwarded
            if let Some(tool_calls) = &msg.tool_calls {
                let openai_tool_calls: Vec<_> = tool_calls
                    .iter()
                    .filter_map(|tc| {
                        tc.function.as_ref().map(|f| ChatCompletionMessageToolCall {
                            id: tc.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: OpenAIFunctionCall {
                                name: f.name.clone(),
                                arguments: f.arguments.clone(),
                            },
                        })
                    })
                    .collect();
                if !openai_tool_calls.is_empty() {
                    builder.tool_calls(openai_tool_calls);
                }
            }

            builder.build()?.into()
        }
        Role::Tool => ChatCompletionRequestToolMessageArgs::default()
            .content(content)
            .tool_call_id(msg.tool_call_id.clone().unwrap_or_default())
            .build()?
            .into(),
    };
    Ok(converted)
}

fn convert_tool(spec: &ToolSpec) -> Result<ChatCompletionTool> {
    Ok(ChatCompletionToolArgs::default()
        .r#type(ChatCompletionToolType::Function)
        .function(
            FunctionObjectArgs::default()
                .name(spec.name.clone())
                .description(spec.description.clone())
                .parameters(spec.parameters.to_json())
                .build()?,
        )
        .build()?)
}

/// Build the wire request. Tool fields are only set when tools are present.
pub(crate) fn to_openai_request(request: &ModelRequest) -> Result<CreateChatCompletionRequest> {
    let messages = request
        .messages
        .iter()
        .map(convert_message)
        .collect::<Result<Vec<_>>>()?;

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder.model(request.model.clone()).messages(messages);

    if let Some(tools) = request.tools.as_ref().filter(|tools| !tools.is_empty()) {
        let tools = tools.iter().map(convert_tool).collect::<Result<Vec<_>>>()?;
        builder.tools(tools);
        if let Some(choice) = request.tool_choice {
            builder.tool_choice(match choice {
                ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
                ToolChoice::None => ChatCompletionToolChoiceOption::None,
                ToolChoice::Required => ChatCompletionToolChoiceOption::Required,
            });
        }
    }

    Ok(builder.build()?)
}

pub(crate) fn from_openai_response(response: CreateChatCompletionResponse) -> ModelResponse {
    let choices = response
        .choices
        .into_iter()
        .map(|choice| {
            let tool_calls = choice
                .message
                .tool_calls
                .map(|calls| calls.into_iter().map(convert_tool_call).collect());
            let finish_reason = choice.finish_reason.and_then(|reason| {
                serde_json::to_value(reason)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
            });
            Choice {
                message: Message {
                    role: Role::Assistant,
                    content: choice.message.content,
                    tool_call_id: None,
                    tool_calls,
                },
                finish_reason,
            }
        })
        .collect();

    ModelResponse {
        id: response.id,
        choices,
        usage: response.usage.map(convert_usage),
    }
}

fn convert_tool_call(call: ChatCompletionMessageToolCall) -> ToolCallRequest {
    ToolCallRequest::function(call.id, call.function.name, call.function.arguments)
}

fn convert_usage(usage: CompletionUsage) -> Usage {
    let prompt = usage.prompt_tokens as usize;
    let completion = usage.completion_tokens as usize;
    Usage::new(prompt, completion)
}

/// Scripted provider for tests and offline runs
///
/// Responses are returned in the order they were added. Once the script is
/// exhausted every call answers `"Default response"`.
#[derive(Debug, Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<ModelResponse>>>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: ModelResponse) -> Self {
        self.push(Ok(response));
        self
    }

    pub fn with_message(self, content: impl Into<String>) -> Self {
        self.with_response(ModelResponse::new_message(content))
    }

    /// A response requesting a single function call with a fresh id.
    pub fn with_tool_call(
        self,
        tool_name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        let id = format!("call_{}", uuid::Uuid::new_v4().simple());
        let call = ToolCallRequest::function(id, tool_name, arguments);
        let response = ModelResponse::new_tool_calls(vec![call]);
        self.with_response(response)
    }

    /// The next call fails as a transport error.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Err(AgentsError::TransportError {
            message: message.into(),
        }));
        self
    }

    fn push(&self, response: Result<ModelResponse>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let response = match next {
            Some(result) => result?,
            None => ModelResponse::new_message("Default response"),
        };
        if response.usage.is_some() {
            return Ok(response);
        }
        Ok(response.with_usage(Usage::new(10, 5)))
    }
}
