//! # OpenAI Agents (lite)
//!
//! A small agent-orchestration layer over OpenAI-compatible chat completions.
//! Declare an [`Agent`] with instructions and tools, send one user message,
//! and get the final answer after the model has optionally called tools.
//!
//! ## Core Concepts
//!
//! - **Tools**: plain functions registered with [`register_tool`] or the
//!   [`function_tool`] attribute. The parameter schema is derived once from
//!   the declared signature.
//! - **Agent**: a name, instructions and an ordered set of tools.
//! - **Runner**: a two-round protocol. One request, at most one dispatch
//!   pass over the requested tool calls, then one finalization request.
//! - **Containment**: unknown tools, bad arguments and failing tools become
//!   `{"error": "..."}` tool results; only configuration and transport
//!   errors end a run.
//!
//! ## Getting Started
//!
//! Set your key in the `OPENAI_API_KEY` (or `API_KEY`) environment variable.
//!
//! ```rust,no_run
//! use openai_agents_lite::{function_tool, Agent, RunConfig, Runner};
//!
//! /// Add two integers.
//! #[function_tool]
//! fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! # async fn example() -> openai_agents_lite::Result<()> {
//! let agent = Agent::new("Calculator", "Use the tools to answer.").with_tool(add_tool());
//! let answer = Runner::run(&agent, "What is 2 + 3?", &RunConfig::from_env()).await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

// Lets `#[function_tool]` expansions name this crate from inside it too.
extern crate self as openai_agents_lite;

pub mod agent;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod items;
pub mod model;
pub mod result;
pub mod runner;
pub mod schema;
pub mod tool;
pub mod usage;

pub use openai_agents_lite_derive::function_tool;

// Public re-exports for convenience
pub use agent::Agent;
pub use config::{ArgumentPolicy, ConfigBuilder, Credentials, ProviderConfig, SdkConfig};
pub use dispatch::{ToolInvocation, ToolRouter};
pub use error::{AgentsError, ArgumentValidationError, Result, ToolError};
pub use items::{Message, ModelRequest, ModelResponse, Role, ToolCallRequest, ToolCallResult};
pub use model::{MockProvider, ModelProvider, OpenAIProvider};
pub use result::RunResult;
pub use runner::{RunConfig, Runner};
pub use schema::{
    derive_parameters, ParamDecl, ParamKind, ParameterSchema, ParametersSchema, SchemaKind,
    TypeHint,
};
pub use tool::{
    register_tool, IntoToolOutput, Tool, ToolArguments, ToolFn, ToolHandle, ToolOutput,
    ToolOverrides, ToolRegistry, ToolSpec,
};
pub use usage::Usage;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
