//! # Runner
//!
//! The `Runner` executes one user turn against an [`Agent`] as a strict
//! two-round protocol:
//!
//! 1. send the system and user messages, advertising the agent's tools;
//! 2. if the reply requests tool calls, dispatch them once through the
//!    [`ToolRouter`] and send a finalization request replaying the assistant
//!    message and every tool result.
//!
//! Tool failures never end a run; they are returned to the model as
//! `{"error": ...}` payloads. Configuration and transport failures do.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::config::{ArgumentPolicy, ProviderConfig, SdkConfig, DEFAULT_MODEL};
use crate::dispatch::{dispatch_all, ToolRouter};
use crate::error::{AgentsError, Result};
use crate::items::{Message, ModelRequest, ModelResponse, Role};
use crate::model::{ModelProvider, OpenAIProvider};
use crate::result::RunResult;
use crate::usage::Usage;

fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((cut, _)) => {
            let mut out = s[..cut].to_string();
            out.push('…');
            out
        }
        None => s.to_string(),
    }
}

fn format_messages_for_log(messages: &[Message]) -> String {
    let mut lines = Vec::new();
    for (idx, m) in messages.iter().enumerate() {
        let content = m.text();
        match m.role {
            Role::System => lines.push(format!(
                "{:02} SYSTEM   | {}",
                idx,
                truncate_for_log(content, 160)
            )),
            Role::User => lines.push(format!(
                "{:02} USER     | {}",
                idx,
                truncate_for_log(content, 160)
            )),
            Role::Assistant => match &m.tool_calls {
                Some(tool_calls) => {
                    let calls: Vec<String> = tool_calls
                        .iter()
                        .map(|tc| match &tc.function {
                            Some(f) => format!("id={}, name={}", tc.id, f.name),
                            None => format!("id={}, <no function>", tc.id),
                        })
                        .collect();
                    lines.push(format!(
                        "{:02} ASSIST   | tool_calls=[{}] content=\"{}\"",
                        idx,
                        calls.join(", "),
                        truncate_for_log(content, 120)
                    ));
                }
                None => lines.push(format!(
                    "{:02} ASSIST   | {}",
                    idx,
                    truncate_for_log(content, 160)
                )),
            },
            Role::Tool => {
                let tcid = m
                    .tool_call_id
                    .as_deref()
                    .unwrap_or("<missing tool_call_id>");
                lines.push(format!(
                    "{:02} TOOL     | tool_call_id={} payload={}",
                    idx,
                    tcid,
                    truncate_for_log(content, 120)
                ));
            }
        }
    }
    lines.join("\n")
}

/// Configuration for an agent run.
///
/// Nothing is read from the process environment unless asked for through
/// [`RunConfig::from_env`] or a [`SdkConfig`] built from it.
///
/// ## Example
///
/// ```rust
/// use openai_agents_lite::{ArgumentPolicy, RunConfig};
///
/// let config = RunConfig::default()
///     .with_model("gpt-4o")
///     .with_api_key("sk-test")
///     .with_parallel_tools(true)
///     .with_argument_policy(ArgumentPolicy::Lenient);
///
/// assert_eq!(config.model, "gpt-4o");
/// assert!(config.parallel_tools);
/// ```
#[derive(Clone)]
pub struct RunConfig {
    /// Model identifier sent with every request.
    pub model: String,

    /// Credentials and endpoint. Resolved at the start of every run, even
    /// when `model_provider` is set, so a missing key always fails first.
    pub provider: ProviderConfig,

    /// Provider override. When `None` an `OpenAIProvider` is built from the
    /// resolved credentials.
    pub model_provider: Option<Arc<dyn ModelProvider>>,

    /// Dispatch the tool calls of one response concurrently. Result order
    /// is the request order either way.
    pub parallel_tools: bool,

    /// Argument checking applied before each tool call.
    pub argument_policy: ArgumentPolicy,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("model", &self.model)
            .field("provider", &self.provider)
            .field("model_provider", &self.model_provider.is_some())
            .field("parallel_tools", &self.parallel_tools)
            .field("argument_policy", &self.argument_policy)
            .finish()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider: ProviderConfig::default(),
            model_provider: None,
            parallel_tools: false,
            argument_policy: ArgumentPolicy::default(),
        }
    }
}

impl From<SdkConfig> for RunConfig {
    fn from(config: SdkConfig) -> Self {
        Self {
            model: config.model,
            provider: config.provider,
            model_provider: None,
            parallel_tools: config.parallel_tools,
            argument_policy: config.argument_policy,
        }
    }
}

impl RunConfig {
    /// Settings from the process environment, read once here.
    pub fn from_env() -> Self {
        crate::config::from_env().into()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.provider.api_key = Some(api_key.into());
        self
    }

    /// Convenience: set a model provider.
    pub fn with_model_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        self.model_provider = Some(provider);
        self
    }

    /// Toggle parallel execution of tool calls within the dispatch round.
    pub fn with_parallel_tools(mut self, enabled: bool) -> Self {
        self.parallel_tools = enabled;
        self
    }

    pub fn with_argument_policy(mut self, policy: ArgumentPolicy) -> Self {
        self.argument_policy = policy;
        self
    }
}

/// Executes agents.
///
/// The runner is stateless; concurrent runs share nothing but the agent,
/// which they only read.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use openai_agents_lite::{Agent, MockProvider, RunConfig, Runner};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(MockProvider::new().with_message("Hello!"));
/// let config = RunConfig::default()
///     .with_api_key("sk-test")
///     .with_model_provider(provider.clone());
///
/// let agent = Agent::new("Greeter", "Greet the user.");
/// let answer = Runner::run(&agent, "hi", &config).await?;
///
/// assert_eq!(answer, "Hello!");
/// assert_eq!(provider.call_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct Runner;

impl Runner {
    /// Run one turn and return the final text.
    pub async fn run(
        agent: &Agent,
        input: impl Into<String>,
        config: &RunConfig,
    ) -> Result<String> {
        Ok(Self::run_detailed(agent, input, config).await?.final_output)
    }

    /// Blocking variant of [`run`](Self::run) on a fresh Tokio runtime.
    ///
    /// Must not be called from within an async context.
    pub fn run_sync(agent: &Agent, input: impl Into<String>, config: &RunConfig) -> Result<String> {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(Self::run(agent, input, config))
    }

    /// Run one turn and return the full conversation, tool results and usage.
    pub async fn run_detailed(
        agent: &Agent,
        input: impl Into<String>,
        config: &RunConfig,
    ) -> Result<RunResult> {
        let input = input.into();
        info!(agent = %agent.name(), model = %config.model, "Starting agent run");

        let credentials = config.provider.resolve()?;
        let provider: Arc<dyn ModelProvider> = match &config.model_provider {
            Some(provider) => Arc::clone(provider),
            None => Arc::new(OpenAIProvider::new(&credentials)),
        };

        let mut messages = vec![Message::system(agent.instructions()), Message::user(input)];
        // Tools without a spec are not advertised but can still be called
        let specs = agent.tool_specs();
        let has_tools = !agent.tools().is_empty();
        let mut usage = Usage::empty();

        debug!(
            agent = %agent.name(),
            tools = specs.len(),
            "Sending initial request\n{}",
            format_messages_for_log(&messages)
        );
        let request = ModelRequest::new(config.model.clone(), messages.clone())
            .with_tools(specs);
        let response = provider.complete(request).await?;
        let assistant = primary_message(&response, &mut usage)?;

        if !assistant.has_tool_calls() || !has_tools {
            if assistant.has_tool_calls() {
                warn!(
                    agent = %agent.name(),
                    "model requested tools but the agent has none; ignoring"
                );
            }
            let final_output = assistant.text().to_string();
            messages.push(assistant);
            info!(agent = %agent.name(), api_calls = 1, "Agent run complete");
            return Ok(RunResult {
                final_output,
                messages,
                tool_results: Vec::new(),
                usage,
                api_calls: 1,
            });
        }

        let tool_calls = assistant.tool_calls.clone().unwrap_or_default();
        let parallel = config.parallel_tools;
        info!(
            agent = %agent.name(),
            count = tool_calls.len(),
            parallel,
            "Dispatching tool calls"
        );
        let router = ToolRouter::new(agent.tool_map(), config.argument_policy);
        let tool_results = dispatch_all(&router, &tool_calls, parallel).await;

        messages.push(assistant);
        for result in &tool_results {
            messages.push(result.to_message());
        }

        debug!(
            agent = %agent.name(),
            "Sending finalization request\n{}",
            format_messages_for_log(&messages)
        );
        let request = ModelRequest::new(config.model.clone(), messages.clone());
        let response = provider.complete(request).await?;
        let final_message = primary_message(&response, &mut usage)?;

        let final_output = final_message.text().to_string();
        messages.push(final_message);
        info!(
            agent = %agent.name(),
            api_calls = 2,
            failed_tools = tool_results.iter().filter(|r| r.is_error()).count(),
            "Agent run complete"
        );

        Ok(RunResult {
            final_output,
            messages,
            tool_results,
            usage,
            api_calls: 2,
        })
    }
}

fn primary_message(response: &ModelResponse, usage: &mut Usage) -> Result<Message> {
    if let Some(reported) = &response.usage {
        *usage += reported.clone();
    }
    response
        .primary_message()
        .cloned()
        .ok_or_else(|| AgentsError::ModelBehaviorError {
            message: format!("completion {} contained no choices", response.id),
        })
}
