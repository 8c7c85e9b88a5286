//! Agent definition and builder

use std::sync::Arc;

use crate::tools::ToolRegistry;

/// Definition of a [`StandardAgent`](super::StandardAgent)
///
/// ```ignore
/// let config = AgentConfig::new("file_manager", "You are a friendly file assistant")
///     .with_description("Lists uploaded files")
///     .with_tools(tools)
///     .with_max_tool_iterations(10)
///     .with_streaming(true);
/// ```
pub struct AgentConfig {
    /// Agent name, used as the author of the events it produces
    pub name: String,

    /// Short description of what the agent does
    pub description: String,

    /// System instruction for the LLM
    pub instruction: String,

    /// Tool registry (optional - agent can work without tools)
    pub tools: Option<Arc<ToolRegistry>>,

    /// Maximum number of model calls per run (prevents infinite tool loops)
    pub max_tool_iterations: usize,

    /// Whether to request streaming responses from the LLM
    pub streaming_enabled: bool,
}

impl AgentConfig {
    /// Create a new agent configuration with a name and system instruction
    pub fn new(name: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: instruction.into(),
            tools: None,
            max_tool_iterations: 100,
            streaming_enabled: false,
        }
    }

    /// Set the agent description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tool registry
    pub fn with_tools(mut self, tools: Arc<ToolRegistry>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Set maximum model calls per run
    pub fn with_max_tool_iterations(mut self, max: usize) -> Self {
        self.max_tool_iterations = max;
        self
    }

    /// Enable or disable streaming responses
    ///
    /// Streaming only changes how the model reply is received; the runner
    /// still yields one event per model turn.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.streaming_enabled = enabled;
        self
    }

    /// Declarations of the registered tools
    pub fn tool_definitions(&self) -> Vec<crate::llm::ToolDefinition> {
        self.tools
            .as_ref()
            .map(|t| t.get_definitions())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("instruction", &format!("{}...", &self.instruction.chars().take(50).collect::<String>()))
            .field("tools", &self.tools.as_ref().map(|t| t.tool_names()))
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("streaming_enabled", &self.streaming_enabled)
            .finish()
    }
}
