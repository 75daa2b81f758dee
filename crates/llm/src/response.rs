//! Chat response abstractions for the unified LLM interfaces

use crate::{Message, Role, tool::ToolCall};
use serde::Deserialize;

/// Common metadata shared between streaming and non-streaming completions
#[derive(Debug, Clone, Deserialize, Default)]
pub struct CompletionMeta {
    /// A unique identifier for the chat completion
    #[serde(default)]
    pub id: String,

    /// The object type
    #[serde(default)]
    pub object: String,

    /// Unix timestamp (in seconds) of when the response was created
    #[serde(default)]
    pub created: u64,

    /// The model used for the completion
    #[serde(default)]
    pub model: String,
}

/// Message content in a completion response
///
/// Used for both streaming deltas and non-streaming response messages.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Delta {
    /// The role of the message author
    pub role: Option<Role>,

    /// The content of the message
    pub content: Option<String>,

    /// Tool calls made by the model
    pub tool_calls: Option<Vec<ToolCall>>,
}

/// A chat completion response from the LLM
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Response {
    /// Completion metadata
    #[serde(flatten)]
    pub meta: CompletionMeta,

    /// The list of completion choices
    pub choices: Vec<Choice>,

    /// Token usage statistics
    #[serde(default)]
    pub usage: Usage,
}

impl Response {
    /// Wrap an assistant message as a single-choice response.
    pub fn of(message: Message) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                message: Delta {
                    role: Some(Role::Assistant),
                    content: Some(message.content),
                    tool_calls: if message.tool_calls.is_empty() {
                        None
                    } else {
                        Some(message.tool_calls.into_vec())
                    },
                },
                finish_reason: Some(FinishReason::Stop),
            }],
            ..Default::default()
        }
    }

    /// Get the first choice as an assistant [`Message`]
    pub fn message(&self) -> Option<Message> {
        let choice = self.choices.first()?;
        Some(Message::assistant(
            choice.message.content.clone().unwrap_or_default(),
            choice.message.tool_calls.as_deref(),
        ))
    }

    /// Get the content of the first choice
    pub fn content(&self) -> Option<&String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_ref())
    }

    /// Get the tool calls of the first choice
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        self.choices
            .first()
            .and_then(|choice| choice.message.tool_calls.as_deref())
    }

    /// Get the reason the model stopped generating
    pub fn reason(&self) -> Option<&FinishReason> {
        self.choices
            .first()
            .and_then(|choice| choice.finish_reason.as_ref())
    }
}

/// A completion choice in a non-streaming response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Choice {
    /// The index of this choice in the list
    #[serde(default)]
    pub index: u32,

    /// The generated message
    pub message: Delta,

    /// The reason the model stopped generating
    pub finish_reason: Option<FinishReason>,
}

/// The reason the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished naturally
    Stop,

    /// The model hit the max token limit
    Length,

    /// Content was filtered
    ContentFilter,

    /// The model is making tool calls
    ToolCalls,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Usage {
    /// Number of tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,

    /// Total number of tokens used
    #[serde(default)]
    pub total_tokens: u32,
}
