//! Scripted LLM provider for testing.
//!
//! Replays canned chunk scripts, one script per model invocation, and
//! records every invocation it receives. Intended for tests that exercise
//! tool dispatch, streaming, and session logic without making real LLM
//! calls.

use crate::{General, LLM, Message, MessageBuilder, Response, Role, StreamChunk};
use anyhow::Result;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

struct Turn {
    chunks: Vec<StreamChunk>,
    /// When set, the stream fails with this message after the chunks.
    error: Option<String>,
    /// When set, the turn suspends forever instead of producing chunks.
    hang: bool,
}

/// One recorded model invocation: the configuration and message list the
/// provider was called with.
#[derive(Clone)]
pub struct Invocation {
    pub config: General,
    pub messages: Vec<Message>,
}

/// A provider that replays pre-scripted turns.
///
/// Each call to [`complete`](LLM::complete) or [`stream`](LLM::stream)
/// consumes the next scripted turn; running past the script yields an
/// error, which doubles as a "model called more often than expected"
/// assertion in tests.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    turns: Arc<Mutex<VecDeque<Turn>>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl ScriptedProvider {
    /// Create a provider with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a turn that streams the given chunks and finishes cleanly.
    pub fn push_turn(&self, chunks: Vec<StreamChunk>) {
        self.turns.lock().unwrap().push_back(Turn {
            chunks,
            error: None,
            hang: false,
        });
    }

    /// Queue a turn that streams the given chunks and then fails.
    pub fn push_failing_turn(&self, chunks: Vec<StreamChunk>, error: impl Into<String>) {
        self.turns.lock().unwrap().push_back(Turn {
            chunks,
            error: Some(error.into()),
            hang: false,
        });
    }

    /// Queue a turn that never produces anything (for timeout tests).
    pub fn push_hanging_turn(&self) {
        self.turns.lock().unwrap().push_back(Turn {
            chunks: Vec::new(),
            error: None,
            hang: true,
        });
    }

    /// The invocations this provider has received, in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    fn next_turn(&self, config: &General, messages: &[Message]) -> Option<Turn> {
        self.invocations.lock().unwrap().push(Invocation {
            config: config.clone(),
            messages: messages.to_vec(),
        });
        self.turns.lock().unwrap().pop_front()
    }
}

impl LLM for ScriptedProvider {
    type ChatConfig = General;

    async fn complete(&self, config: &General, messages: &[Message]) -> Result<Response> {
        let Some(turn) = self.next_turn(config, messages) else {
            anyhow::bail!("scripted provider exhausted");
        };
        if turn.hang {
            std::future::pending::<()>().await;
        }
        if let Some(error) = turn.error {
            anyhow::bail!(error);
        }

        let mut builder = MessageBuilder::new(Role::Assistant);
        for chunk in &turn.chunks {
            builder.accept(chunk);
        }
        Ok(Response::of(builder.build()))
    }

    fn stream(
        &self,
        config: General,
        messages: &[Message],
    ) -> impl futures_core::Stream<Item = Result<StreamChunk>> + Send {
        let turn = self.next_turn(&config, messages);

        async_stream::try_stream! {
            match turn {
                Some(turn) => {
                    if turn.hang {
                        std::future::pending::<()>().await;
                    }
                    for chunk in turn.chunks {
                        yield chunk;
                    }
                    if let Some(error) = turn.error {
                        Err(anyhow::anyhow!(error))?;
                    }
                }
                None => Err(anyhow::anyhow!("scripted provider exhausted"))?,
            }
        }
    }
}
