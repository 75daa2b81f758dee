//! Turn stream multiplexer.
//!
//! Adapts the runtime's internal chunk stream into the outward event
//! stream a client consumes: one `Meta` event first, then one `Content`
//! event per assistant delta. Tool calls and tool results never appear
//! here — they are orchestration detail.
//!
//! The multiplexer also owns end-of-turn persistence: after the runtime
//! reaches its final answer the concatenated assistant content is written
//! to the transcript store exactly once. A turn that fails mid-stream is
//! surfaced as a terminal `"Error"` delta and not persisted.

use crate::builder::AGENT;
use compact_str::CompactString;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{LLM, Message};
use runtime::{Chat, Runtime};
use serde::Serialize;
use std::sync::Arc;
use store::TranscriptStore;

/// The delta sent to the client when a turn dies mid-stream.
pub const ERROR_MARKER: &str = "Error";

/// One outward stream event.
///
/// On the wire each event is a `data: <JSON>\n\n` frame: the first frame
/// is `{"convoId": ...}`, every later frame `{"content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TurnEvent {
    /// Sent exactly once, first: the conversation this turn belongs to.
    Meta {
        #[serde(rename = "convoId")]
        convo_id: CompactString,
    },
    /// One incremental fragment of the assistant answer.
    Content { content: String },
}

/// Run one conversation turn, multiplexing it into [`TurnEvent`]s.
///
/// `prior` is the conversation session loaded from the transcript store;
/// the new user message is assumed to be persisted already. The stream is
/// lazy end-to-end: dropping it (client disconnect) drops the upstream
/// model stream at the next suspension point.
pub fn turn_stream<P>(
    runtime: Arc<Runtime<P>>,
    store: Arc<TranscriptStore>,
    convo_id: CompactString,
    prior: Vec<Message>,
    text: String,
) -> impl Stream<Item = TurnEvent> + Send
where
    P: LLM + Send + Sync + 'static,
{
    async_stream::stream! {
        yield TurnEvent::Meta {
            convo_id: convo_id.clone(),
        };

        let mut chat = Chat::with_history(AGENT, prior);
        let mut answer = String::new();
        let mut failed = false;

        {
            let inner = runtime.stream(&mut chat, Message::user(text));
            futures_util::pin_mut!(inner);

            while let Some(item) = inner.next().await {
                match item {
                    Ok(chunk) => {
                        if let Some(content) = chunk.content() {
                            answer.push_str(content);
                            yield TurnEvent::Content {
                                content: content.to_owned(),
                            };
                        }
                    }
                    Err(e) => {
                        tracing::error!("turn failed mid-stream: {e:?}");
                        failed = true;
                        yield TurnEvent::Content {
                            content: ERROR_MARKER.to_owned(),
                        };
                        break;
                    }
                }
            }
        }

        if failed {
            return;
        }

        // The client has its answer; a write failure here is a
        // durability-only loss. Retry once, then log.
        if let Err(e) = store.append_message(&convo_id, store::Role::Assistant, &answer) {
            tracing::warn!("transcript write failed: {e}; retrying");
            if let Err(e) = store.append_message(&convo_id, store::Role::Assistant, &answer) {
                tracing::error!("transcript write failed after retry, answer lost: {e}");
            }
        }
    }
}

/// Map persisted rows into the model-facing message list.
pub fn session_messages(records: &[store::MessageRecord]) -> Vec<Message> {
    records
        .iter()
        .map(|record| match record.role {
            store::Role::User => Message::user(record.content.clone()),
            store::Role::Assistant => Message::assistant(record.content.clone(), None),
            store::Role::System => Message::system(record.content.clone()),
        })
        .collect()
}
