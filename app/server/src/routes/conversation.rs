//! Conversation CRUD endpoints.

use crate::{
    auth::Authenticator,
    error::ApiError,
    routes::{bearer, derive_title},
    state::AppState,
};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use llm::LLM;
use serde::Deserialize;
use serde_json::{Value, json};

/// Request body for conversation creation.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// First message, used to derive the title.
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body for conversation deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,
}

/// `POST /api/conversation` — create a conversation ahead of the first
/// turn and return its id.
pub async fn create<P, A>(
    State(state): State<AppState<P, A>>,
    headers: HeaderMap,
    Json(body): Json<CreateRequest>,
) -> Result<Json<Value>, ApiError>
where
    P: LLM + Send + Sync + 'static,
    A: Authenticator + 'static,
{
    let identity = state
        .authenticator
        .authenticate(bearer(&headers))
        .await
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Unauthenticated"))?;

    let title = derive_title(body.message.as_deref().unwrap_or_default());
    let conversation = state.store.create_conversation(&identity.user_id, title)?;

    Ok(Json(json!({
        "success": true,
        "message": conversation.id,
    })))
}

/// `GET /api/conversation` — the caller's conversations, most recently
/// updated first.
pub async fn list<P, A>(
    State(state): State<AppState<P, A>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    P: LLM + Send + Sync + 'static,
    A: Authenticator + 'static,
{
    let identity = state
        .authenticator
        .authenticate(bearer(&headers))
        .await
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Unauthenticated"))?;

    let chats = state.store.list_conversations(&identity.user_id)?;
    if chats.is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "No conversations found",
        ));
    }

    Ok(Json(json!({
        "success": true,
        "message": chats,
    })))
}

/// `DELETE /api/conversation` — remove a conversation (messages cascade)
/// and return the removed record.
pub async fn remove<P, A>(
    State(state): State<AppState<P, A>>,
    headers: HeaderMap,
    Json(body): Json<DeleteRequest>,
) -> Result<Json<Value>, ApiError>
where
    P: LLM + Send + Sync + 'static,
    A: Authenticator + 'static,
{
    let Some(conversation_id) = body.conversation_id.as_deref() else {
        return Err(ApiError::invalid_input());
    };

    let identity = state
        .authenticator
        .authenticate(bearer(&headers))
        .await
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Unauthenticated"))?;

    let removed = state
        .store
        .delete_conversation(&identity.user_id, conversation_id)?
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "Conversation not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": removed,
    })))
}
