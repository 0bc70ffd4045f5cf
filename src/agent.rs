//! # Agent
//!
//! An `Agent` binds a name, instructions and a set of tools. It is built once
//! by the caller and only read by the [`Runner`](crate::Runner): the
//! instructions become the system message of every run, and the tools are
//! exposed through [`Agent::tool_specs`] (what the model is told) and
//! [`Agent::tool_map`] (what dispatch resolves against).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::tool::{Tool, ToolSpec};

/// A named set of instructions and tools.
///
/// ## Example
///
/// ```rust
/// use openai_agents_lite::{register_tool, Agent, ToolFn, ToolOverrides, ToolOutput};
///
/// let ping = ToolFn::new("ping", |_| Ok(ToolOutput::text("pong"))).doc("Health check.");
/// let handle = register_tool(&ping, ToolOverrides::default()).unwrap();
///
/// let agent = Agent::new("Ops", "Answer operational questions.").with_tool(handle);
///
/// assert_eq!(agent.tool_specs().len(), 1);
/// assert_eq!(agent.tool_specs()[0].description, "Health check.");
/// assert!(agent.tool_map().contains_key("ping"));
/// ```
#[derive(Clone)]
pub struct Agent {
    name: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
    handoff_description: Option<String>,
}

impl Agent {
    /// Creates an agent without tools.
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: Vec::new(),
            handoff_description: None,
        }
    }

    /// Adds a tool. Registration order is the order specs are advertised in.
    pub fn with_tool(mut self, tool: impl Into<Arc<dyn Tool>>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn with_tools<T>(mut self, tools: impl IntoIterator<Item = T>) -> Self
    where
        T: Into<Arc<dyn Tool>>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    /// Description used if this agent is offered as a handoff target. Carried
    /// only; nothing routes on it.
    pub fn with_handoff_description(mut self, description: impl Into<String>) -> Self {
        self.handoff_description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn handoff_description(&self) -> Option<&str> {
        self.handoff_description.as_deref()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Specs of every tool that has one, in registration order.
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .filter_map(|tool| tool.spec().cloned())
            .collect()
    }

    /// Name to tool. On a name collision the later tool wins.
    pub fn tool_map(&self) -> HashMap<String, Arc<dyn Tool>> {
        let mut map: HashMap<String, Arc<dyn Tool>> = HashMap::with_capacity(self.tools.len());
        for tool in &self.tools {
            let name = tool.name().to_string();
            if map.insert(name, Arc::clone(tool)).is_some() {
                tracing::warn!(
                    agent = %self.name,
                    tool = tool.name(),
                    "duplicate tool name, later registration wins"
                );
            }
        }
        map
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("instructions", &self.instructions)
            .field("tools", &self.tools.len())
            .field("handoff_description", &self.handoff_description)
            .finish()
    }
}
