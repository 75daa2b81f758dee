//! Tool abstractions for the unified LLM interfaces

use schemars::Schema;
use serde::{Deserialize, Serialize};

/// A tool advertised to the LLM
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tool {
    /// The name of the tool
    pub name: String,

    /// The description of the tool
    pub description: String,

    /// The parameters of the tool
    pub parameters: Schema,

    /// Whether to strictly validate the parameters
    pub strict: bool,
}

impl Tool {
    /// Create a tool with the given name, description, and parameter schema.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Schema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            strict: false,
        }
    }
}

/// A tool call made by the model
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolCall {
    /// The ID of the tool call
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// The index of the tool call (used in streaming)
    #[serde(default, skip_serializing)]
    pub index: u32,

    /// The type of tool (currently only "function")
    #[serde(default, rename = "type")]
    pub call_type: String,

    /// The function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Merge two tool calls into one
    pub fn merge(&mut self, call: &Self) {
        if !call.id.is_empty() {
            self.id.clone_from(&call.id);
        }
        if !call.call_type.is_empty() {
            self.call_type.clone_from(&call.call_type);
        }
        if !call.function.name.is_empty() {
            self.function.name.clone_from(&call.function.name);
        }
        self.function.arguments.push_str(&call.function.arguments);
    }
}

/// A function call within a tool call
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FunctionCall {
    /// The name of the function to call
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// The arguments to pass to the function (JSON string)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub arguments: String,
}

/// Controls which tool is called by the model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum ToolChoice {
    /// Model will not call any tool
    #[serde(rename = "none")]
    None,

    /// Model can pick between generating a message or calling tools
    #[serde(rename = "auto")]
    #[default]
    Auto,

    /// Model must call one or more tools
    #[serde(rename = "required")]
    Required,

    /// Model must call the specified function
    Function {
        r#type: String,
        function: ToolChoiceFunction,
    },
}

/// A specific function to call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolChoiceFunction {
    /// The name of the function to call
    pub name: String,
}

impl From<&str> for ToolChoice {
    fn from(value: &str) -> Self {
        ToolChoice::Function {
            r#type: "function".into(),
            function: ToolChoiceFunction { name: value.into() },
        }
    }
}
