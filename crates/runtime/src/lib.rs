//! Podbay runtime: the turn orchestrator.
//!
//! A turn alternates between two states: ask the model, then run whatever
//! tool calls it requested, feed the results back, and ask again. The loop
//! ends when the model answers without tool calls (or the round budget is
//! spent, in which case the final round forbids tool calls so the model
//! must answer in text).
//!
//! # Example
//!
//! ```rust,ignore
//! use runtime::{Agent, Chat, Runtime};
//! use llm::{General, Message};
//!
//! let mut runtime = Runtime::new(General::default(), provider);
//! runtime.add_agent(Agent::new("hal").system_prompt("You are HAL 7000."));
//! runtime.register(search_tool, |args| async move { Ok(format!("results for {args}")) });
//! let mut chat = runtime.chat("hal")?;
//! let answer = runtime.send(&mut chat, Message::user("hello")).await?;
//! ```

pub use crate::{agent::Agent, chat::Chat, error::ToolError};

use anyhow::Result;
use compact_str::CompactString;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{Config, FinishReason, General, LLM, Message, Role, StreamChunk, Tool, ToolCall, ToolChoice};
use std::{collections::BTreeMap, future::Future, pin::Pin, sync::Arc, time::Duration};

mod agent;
mod chat;
mod error;

/// Default bound on model ⇄ tool rounds per turn.
pub const DEFAULT_MAX_ROUNDS: usize = 8;

/// Default per-model-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// A type-erased async tool handler.
///
/// Takes the raw JSON argument string; handlers parse and validate their
/// own typed arguments and report [`ToolError::InvalidArgs`] on mismatch.
pub type Handler = Arc<
    dyn Fn(String) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send>>
        + Send
        + Sync,
>;

/// The podbay runtime — turn orchestrator and tool registry.
///
/// Holds the LLM provider, agent configurations, and tool handlers.
/// Conversation histories are *not* held here: callers own a [`Chat`]
/// per request and pass it in by reference.
pub struct Runtime<P: LLM> {
    provider: P,
    config: General,
    agents: BTreeMap<CompactString, Agent>,
    tools: BTreeMap<CompactString, (Tool, Handler)>,
    max_rounds: usize,
    call_timeout: Duration,
}

impl<P: LLM> Runtime<P> {
    /// Create a new runtime with the given config and provider.
    pub fn new(config: General, provider: P) -> Self {
        Self {
            provider,
            config,
            agents: BTreeMap::new(),
            tools: BTreeMap::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the model ⇄ tool round budget.
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    /// Override the per-model-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Register an agent.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.insert(agent.name.as_str().into(), agent);
    }

    /// Get a registered agent by name.
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.get(name)
    }

    /// Register a tool with its handler.
    pub fn register<F, Fut>(&mut self, tool: Tool, handler: F)
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ToolError>> + Send + 'static,
    {
        let name = CompactString::new(&tool.name);
        let handler: Handler = Arc::new(move |args| Box::pin(handler(args)));
        self.tools.insert(name, (tool, handler));
    }

    /// Create a new chat session for the named agent.
    pub fn chat(&self, agent: &str) -> Result<Chat> {
        if !self.agents.contains_key(agent) {
            anyhow::bail!("agent '{agent}' not registered");
        }
        Ok(Chat::new(agent))
    }

    /// Resolve tool schemas for the given tool names.
    fn resolve(&self, names: &[String]) -> Vec<Tool> {
        names
            .iter()
            .filter_map(|name| self.tools.get(name.as_str()).map(|(tool, _)| tool.clone()))
            .collect()
    }

    /// Dispatch tool calls strictly in issuance order.
    ///
    /// Every call produces exactly one tool-role message answering its call
    /// id. Unknown tools and failed invocations fold their error text into
    /// the result content; they never abort the turn.
    async fn dispatch(&self, calls: &[ToolCall]) -> Vec<Message> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let name = call.function.name.as_str();
            let output = match self.tools.get(name) {
                Some((_, handler)) => {
                    handler(call.function.arguments.clone())
                        .await
                        .unwrap_or_else(|e| {
                            tracing::warn!("{e}");
                            e.to_string()
                        })
                }
                None => {
                    let e = ToolError::UnknownTool { name: name.into() };
                    tracing::warn!("{e}");
                    e.to_string()
                }
            };
            results.push(Message::tool(output, call.id.clone()));
        }
        results
    }

    /// Build the message list for an API request: the fixed system prompt
    /// first (exactly once), then the session history.
    fn api_messages(&self, chat: &Chat) -> Vec<Message> {
        let mut messages = chat.messages.clone();
        if messages.first().map(|m| m.role) != Some(Role::System)
            && let Some(agent) = self.agents.get(chat.agent_name())
        {
            messages.insert(0, Message::system(&agent.system_prompt));
        }
        messages
    }

    /// Tool choice for the given round: the final permitted round forbids
    /// tool calls so the turn terminates with a text answer.
    fn round_choice(&self, round: usize) -> ToolChoice {
        if round + 1 >= self.max_rounds {
            ToolChoice::None
        } else {
            ToolChoice::Auto
        }
    }

    /// Build a provider config with the given tools and tool choice.
    fn build_config(&self, tools: Vec<Tool>, tool_choice: ToolChoice) -> P::ChatConfig {
        self.config
            .clone()
            .with_tools(tools)
            .with_tool_choice(tool_choice)
            .into()
    }

    /// Send a message through a chat session (non-streaming).
    ///
    /// Appends the model's messages and all tool results to the session
    /// and returns the finalized assistant message.
    pub async fn send(&self, chat: &mut Chat, message: Message) -> Result<Message> {
        let agent = self
            .agents
            .get(chat.agent_name())
            .ok_or_else(|| anyhow::anyhow!("agent '{}' not registered", chat.agent_name()))?;
        let tools = self.resolve(&agent.tools);
        chat.messages.push(message);

        for round in 0..self.max_rounds {
            let messages = self.api_messages(chat);
            let cfg = self.build_config(tools.clone(), self.round_choice(round));
            let response =
                tokio::time::timeout(self.call_timeout, self.provider.complete(&cfg, &messages))
                    .await
                    .map_err(|_| {
                        anyhow::anyhow!("model call timed out after {:?}", self.call_timeout)
                    })??;

            let Some(message) = response.message() else {
                anyhow::bail!("model returned no choices");
            };

            if message.tool_calls.is_empty() {
                chat.messages.push(message.clone());
                return Ok(message);
            }

            let results = self.dispatch(&message.tool_calls).await;
            chat.messages.push(message);
            chat.messages.extend(results);
        }

        anyhow::bail!("tool round budget exhausted without a final answer");
    }

    /// Stream a message through a chat session.
    ///
    /// Yields only content-bearing chunks — tool calls and tool results
    /// stay inside the session history. On completion the assembled
    /// assistant message and every intermediate tool message have been
    /// appended to `chat.messages` in issuance order.
    pub fn stream<'a>(
        &'a self,
        chat: &'a mut Chat,
        message: Message,
    ) -> impl Stream<Item = Result<StreamChunk>> + 'a {
        let agent = self.agents.get(chat.agent_name()).cloned();
        let tools = agent
            .as_ref()
            .map(|a| self.resolve(&a.tools))
            .unwrap_or_default();

        async_stream::try_stream! {
            if agent.is_none() {
                Err(anyhow::anyhow!("agent '{}' not registered", chat.agent_name()))?;
            }

            chat.messages.push(message);

            for round in 0..self.max_rounds {
                let messages = self.api_messages(chat);
                let cfg = self.build_config(tools.clone(), self.round_choice(round));
                let mut builder = Message::builder(Role::Assistant);

                let inner = self.provider.stream(cfg, &messages);
                futures_util::pin_mut!(inner);

                loop {
                    let item =
                        match tokio::time::timeout(self.call_timeout, inner.next()).await {
                            Ok(item) => item,
                            Err(_) => Err(anyhow::anyhow!(
                                "model stream timed out after {:?}",
                                self.call_timeout
                            ))?,
                        };
                    let Some(result) = item else { break };

                    let chunk = match result {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            tracing::error!("model stream error: {e:?}");
                            Err(e)?
                        }
                    };

                    let reason = chunk.reason().cloned();

                    if builder.accept(&chunk) {
                        yield chunk;
                    }

                    if let Some(reason) = reason {
                        match reason {
                            FinishReason::Stop | FinishReason::ToolCalls => break,
                            reason => {
                                Err(anyhow::anyhow!("unexpected finish reason: {reason:?}"))?
                            }
                        }
                    }
                }

                let assembled = builder.build();
                if assembled.tool_calls.is_empty() {
                    chat.messages.push(assembled);
                    return;
                }

                let results = self.dispatch(&assembled.tool_calls).await;
                chat.messages.push(assembled);
                chat.messages.extend(results);
            }

            Err(anyhow::anyhow!(
                "tool round budget exhausted without a final answer"
            ))?;
        }
    }
}
