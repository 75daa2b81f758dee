//! Streaming chat endpoint.
//!
//! `POST /api/chat` runs one conversation turn and responds with a
//! `text/event-stream` body: a `{"convoId"}` frame first, then one
//! `{"content"}` frame per assistant delta.

use crate::{
    auth::Authenticator,
    error::ApiError,
    routes::{bearer, derive_title},
    state::AppState,
    stream::{session_messages, turn_stream},
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::sse::{Event, Sse},
};
use compact_str::CompactString;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::LLM;
use serde::Deserialize;
use std::sync::Arc;

/// Request body for one turn.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message. Required, non-empty.
    #[serde(default)]
    pub message: Option<String>,

    /// Existing conversation to continue; absent on the first turn.
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,
}

/// Run one streamed conversation turn.
pub async fn chat<P, A>(
    State(state): State<AppState<P, A>>,
    headers: HeaderMap,
    Json(body): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>> + Send + 'static>, ApiError>
where
    P: LLM + Send + Sync + 'static,
    A: Authenticator + 'static,
{
    let Some(text) = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        return Err(ApiError::invalid_input());
    };

    let identity = state
        .authenticator
        .authenticate(bearer(&headers))
        .await
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "User not found"))?;
    if !identity.verified {
        return Err(ApiError::unverified());
    }

    let convo_id = match body.conversation_id.as_deref() {
        Some(id) => {
            // Must be well-formed and owned by the caller, so nobody can
            // append to someone else's conversation.
            if uuid::Uuid::parse_str(id).is_err() || !state.store.owned(&identity.user_id, id)? {
                return Err(ApiError::new(
                    StatusCode::UNAUTHORIZED,
                    "Invalid conversation Id",
                ));
            }
            CompactString::new(id)
        }
        None => {
            state
                .store
                .create_conversation(&identity.user_id, derive_title(text))?
                .id
        }
    };

    // The session is whatever the transcript holds so far; the user
    // message is durable before the first frame goes out.
    let prior = session_messages(&state.store.history(&convo_id)?);
    state
        .store
        .append_message(&convo_id, store::Role::User, text)?;

    let events = turn_stream(
        Arc::clone(&state.runtime),
        Arc::clone(&state.store),
        convo_id,
        prior,
        text.to_owned(),
    );
    let frames = events.map(|event| Event::default().json_data(&event));

    Ok(Sse::new(frames))
}
