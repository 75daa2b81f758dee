//! Configuration for a chat

use crate::{Tool, ToolChoice};
use serde::{Deserialize, Serialize};

/// LLM configuration
pub trait Config: From<General> + Sized + Clone {
    /// Create a new configuration with tools
    fn with_tools(self, tools: Vec<Tool>) -> Self;

    /// Create a new configuration with tool choice
    ///
    /// This should be used at the per-request level.
    fn with_tool_choice(self, tool_choice: ToolChoice) -> Self;
}

/// Chat configuration
///
/// Temperature and retry count are fixed configuration, set once when the
/// application starts, not per-call parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct General {
    /// The model to use
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// How many times to retry a failed completion request
    pub max_retries: u32,

    /// Whether to return usage information in stream mode
    pub usage: bool,

    /// The tools to advertise to the model
    pub tools: Option<Vec<Tool>>,

    /// Which tool the model may call
    #[serde(default)]
    pub tool_choice: ToolChoice,
}

impl General {
    /// Create a new configuration
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

impl Default for General {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            temperature: 0.0,
            max_retries: 2,
            usage: false,
            tools: None,
            tool_choice: ToolChoice::Auto,
        }
    }
}

impl Config for General {
    fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }

    fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }
}
