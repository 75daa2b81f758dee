//! The request body for the Gemini OpenAI-compatible API

use llm::{Config, General, Message, Tool, ToolChoice};
use serde::Serialize;
use serde_json::{Value, json};

/// The request body for the Gemini OpenAI-compatible API
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model we are using
    pub model: String,

    /// The messages to send to the API
    pub messages: Vec<Message>,

    /// The temperature to use for the response
    pub temperature: f32,

    /// Whether to stream the response
    pub stream: bool,

    /// Stream options
    #[serde(skip_serializing_if = "Value::is_null")]
    pub stream_options: Value,

    /// A list of tools the model may call
    #[serde(skip_serializing_if = "Value::is_null")]
    pub tools: Value,

    /// Controls which (if any) tool is called by the model
    #[serde(skip_serializing_if = "Value::is_null")]
    pub tool_choice: Value,

    /// How many times to retry a failed completion request
    #[serde(skip)]
    pub max_retries: u32,

    /// Whether to request usage information in stream mode
    #[serde(skip)]
    usage: bool,
}

impl Request {
    /// Construct the request with the given messages
    pub fn messages(&self, messages: &[Message]) -> Self {
        Self {
            messages: messages.to_vec(),
            ..self.clone()
        }
    }

    /// Enable streaming for the request
    pub fn stream_mode(mut self) -> Self {
        self.stream = true;
        self.stream_options = if self.usage {
            json!({ "include_usage": true })
        } else {
            Value::Null
        };
        self
    }
}

impl From<General> for Request {
    fn from(config: General) -> Self {
        let tools = serialize_tools(config.tools.as_deref().unwrap_or_default());
        let tool_choice = choice_for(&tools, &config.tool_choice);

        Self {
            model: config.model,
            messages: Vec::new(),
            temperature: config.temperature,
            stream: false,
            stream_options: Value::Null,
            tools,
            tool_choice,
            max_retries: config.max_retries,
            usage: config.usage,
        }
    }
}

impl Config for Request {
    fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = serialize_tools(&tools);
        self
    }

    fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = choice_for(&self.tools, &tool_choice);
        self
    }
}

/// Serialize tools to the `{"type": "function", "function": ...}` shape
fn serialize_tools(tools: &[Tool]) -> Value {
    if tools.is_empty() {
        return Value::Null;
    }

    let tools: Vec<Value> = tools
        .iter()
        .map(|tool| json!({ "type": "function", "function": tool }))
        .collect();

    Value::Array(tools)
}

/// A tool choice only makes sense when tools are advertised
fn choice_for(tools: &Value, choice: &ToolChoice) -> Value {
    if tools.is_null() {
        return Value::Null;
    }
    serde_json::to_value(choice).unwrap_or(Value::Null)
}
