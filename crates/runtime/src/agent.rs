//! Agent configuration.
//!
//! An [`Agent`] is pure config — name, system prompt, and tool names.
//! Tool handlers live in the [`Runtime`](crate::Runtime).

/// An agent configuration.
///
/// Agents describe *what* an agent does but not *how* tool calls are
/// dispatched; the [`Runtime`](crate::Runtime) holds the handlers.
#[derive(Debug, Clone, Default)]
pub struct Agent {
    /// Agent identifier.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// System prompt placed first in every model request.
    pub system_prompt: String,
    /// Names of tools this agent can use (resolved by the runtime).
    pub tools: Vec<String>,
}

impl Agent {
    /// Create a new agent with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a tool by name.
    pub fn tool(mut self, name: impl Into<String>) -> Self {
        self.tools.push(name.into());
        self
    }
}
