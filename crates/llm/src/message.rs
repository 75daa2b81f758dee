//! Chat messages and the streaming message builder.

use crate::{StreamChunk, ToolCall};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// A message in the chat
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Message {
    /// The role of the message
    pub role: Role,

    /// The content of the message
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    /// The tool call id (role = tool only), referencing a call emitted by
    /// the immediately preceding assistant message
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub tool_call_id: CompactString,

    /// The tool calls requested by the model (role = assistant only)
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub tool_calls: SmallVec<[ToolCall; 4]>,
}

impl Message {
    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            ..Default::default()
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>, tool_calls: Option<&[ToolCall]>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: tool_calls
                .map(|tc| tc.iter().cloned().collect())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Create a new tool-result message answering the given call id
    pub fn tool(content: impl Into<String>, call: impl Into<CompactString>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: call.into(),
            ..Default::default()
        }
    }

    /// Create a new message builder
    pub fn builder(role: Role) -> MessageBuilder {
        MessageBuilder::new(role)
    }
}

/// Accumulates stream chunks into a single message.
///
/// Content deltas are concatenated; tool-call fragments are merged by
/// stream index, so a call whose id, name, and arguments arrive across
/// several chunks assembles into one [`ToolCall`].
pub struct MessageBuilder {
    message: Message,
    calls: BTreeMap<u32, ToolCall>,
}

impl MessageBuilder {
    /// Create a new message builder
    pub fn new(role: Role) -> Self {
        Self {
            message: Message {
                role,
                ..Default::default()
            },
            calls: BTreeMap::new(),
        }
    }

    /// Accept a chunk from the stream.
    ///
    /// Returns `true` when the chunk carried visible content, i.e. when a
    /// consumer forwarding deltas downstream should forward this one.
    pub fn accept(&mut self, chunk: &StreamChunk) -> bool {
        if let Some(calls) = chunk.tool_calls() {
            for call in calls {
                let entry = self.calls.entry(call.index).or_default();
                entry.merge(call);
            }
        }

        match chunk.content() {
            Some(content) => {
                self.message.content.push_str(content);
                true
            }
            None => false,
        }
    }

    /// Build the message
    pub fn build(mut self) -> Message {
        if !self.calls.is_empty() {
            self.message.tool_calls = self.calls.into_values().collect();
        }
        self.message
    }
}

/// The role of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
pub enum Role {
    /// The user role
    #[serde(rename = "user")]
    #[default]
    User,
    /// The assistant role
    #[serde(rename = "assistant")]
    Assistant,
    /// The system role
    #[serde(rename = "system")]
    System,
    /// The tool role
    #[serde(rename = "tool")]
    Tool,
}
