//! Unified LLM interface types and traits.
//!
//! This crate provides the shared types used by every provider and by the
//! agent runtime: `Message`, `Response`, `StreamChunk`, `Tool`, `General`,
//! and the `LLM` trait. `ScriptedProvider` is a canned-response provider
//! for tests that exercise orchestration without real LLM calls.

pub use config::{Config, General};
pub use message::{Message, MessageBuilder, Role};
pub use provider::LLM;
pub use response::{Choice, CompletionMeta, Delta, FinishReason, Response, Usage};
pub use scripted::{Invocation, ScriptedProvider};
pub use stream::{StreamChoice, StreamChunk};
pub use tool::{FunctionCall, Tool, ToolCall, ToolChoice, ToolChoiceFunction};

mod config;
mod message;
mod provider;
mod response;
mod scripted;
mod stream;
mod tool;
