//! Provider abstractions for the unified LLM interfaces

use crate::{Config, Message, Response, StreamChunk};
use anyhow::Result;
use futures_core::Stream;

/// A trait for LLM providers
///
/// Uses RPITIT, no dyn dispatch. Callers are expected to always place the
/// system prompt first in `messages` and to advertise the full tool list
/// through the configuration on every invocation.
pub trait LLM: Sized + Clone {
    /// The chat configuration.
    type ChatConfig: Config + Send;

    /// Single-shot completion. The returned message may carry tool calls
    /// instead of content.
    fn complete(
        &self,
        config: &Self::ChatConfig,
        messages: &[Message],
    ) -> impl Future<Output = Result<Response>> + Send;

    /// Streaming completion: a lazy, forward-only, single-consumption
    /// sequence of chunks, finite per invocation.
    fn stream(
        &self,
        config: Self::ChatConfig,
        messages: &[Message],
    ) -> impl Stream<Item = Result<StreamChunk>> + Send;
}
