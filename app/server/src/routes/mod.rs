//! HTTP routes.

pub mod chat;
pub mod conversation;
pub mod messages;

use crate::{auth::Authenticator, state::AppState};
use axum::{
    Router,
    http::{HeaderMap, header},
    routing::{get, post},
};
use llm::LLM;

/// Build the axum router with all API endpoints.
pub fn router<P, A>(state: AppState<P, A>) -> Router
where
    P: LLM + Send + Sync + 'static,
    A: Authenticator + 'static,
{
    Router::new()
        .route("/api/chat", post(chat::chat::<P, A>))
        .route(
            "/api/conversation",
            post(conversation::create::<P, A>)
                .get(conversation::list::<P, A>)
                .delete(conversation::remove::<P, A>),
        )
        .route("/api/conversation/messages", get(messages::page::<P, A>))
        .with_state(state)
}

/// Pull the bearer token out of the Authorization header.
///
/// Missing or malformed headers yield the empty token, which no
/// authenticator accepts.
pub fn bearer(headers: &HeaderMap) -> &str {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .unwrap_or_default()
}

/// Conversation title for a first message: its first 30 characters.
pub fn derive_title(message: &str) -> &str {
    let message = message.trim();
    if message.is_empty() {
        return "New chat";
    }
    match message.char_indices().nth(30) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}
