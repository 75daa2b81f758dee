//! Per-request conversation session.

use compact_str::CompactString;
use llm::Message;

/// One conversation's message history for the duration of a request.
///
/// A `Chat` is owned by the caller and passed into the runtime by
/// reference — there is no process-global session state. Callers that
/// persist conversations reload the prior turns and rebuild a `Chat`
/// per request with [`with_history`](Chat::with_history).
#[derive(Debug, Clone)]
pub struct Chat {
    agent: CompactString,
    /// The ordered message history. The fixed system prompt is *not*
    /// part of this list; the runtime prepends it on every invocation.
    pub messages: Vec<Message>,
}

impl Chat {
    /// Create an empty session for the named agent.
    pub fn new(agent: impl Into<CompactString>) -> Self {
        Self {
            agent: agent.into(),
            messages: Vec::new(),
        }
    }

    /// Create a session seeded with prior turns.
    pub fn with_history(agent: impl Into<CompactString>, messages: Vec<Message>) -> Self {
        Self {
            agent: agent.into(),
            messages,
        }
    }

    /// The name of the agent this session talks to.
    pub fn agent_name(&self) -> &str {
        &self.agent
    }
}
