//! History pagination endpoint.

use crate::{auth::Authenticator, error::ApiError, routes::bearer, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use llm::LLM;
use serde::Deserialize;
use serde_json::{Value, json};

/// Query parameters for history pagination.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default, rename = "conversationId")]
    pub conversation_id: Option<String>,

    /// Millisecond timestamp cursor; only messages strictly older are
    /// returned.
    #[serde(default)]
    pub before: Option<i64>,

    /// Page size, defaults to 10.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// `GET /api/conversation/messages` — one page of messages, newest
/// first. 404 means "no more pages" to a cursor-based consumer.
pub async fn page<P, A>(
    State(state): State<AppState<P, A>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError>
where
    P: LLM + Send + Sync + 'static,
    A: Authenticator + 'static,
{
    let identity = state
        .authenticator
        .authenticate(bearer(&headers))
        .await
        .map_err(|_| ApiError::new(StatusCode::UNAUTHORIZED, "Unauthenticated"))?;

    let Some(conversation_id) = query
        .conversation_id
        .as_deref()
        .filter(|id| uuid::Uuid::parse_str(id).is_ok())
    else {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Invalid conversation Id",
        ));
    };

    if !state.store.owned(&identity.user_id, conversation_id)? {
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Unauthenticated"));
    }

    let limit = query
        .limit
        .filter(|l| *l > 0)
        .unwrap_or(store::DEFAULT_PAGE_SIZE);
    let messages = state.store.page(conversation_id, query.before, limit)?;
    if messages.is_empty() {
        return Err(ApiError::not_found("No messages found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": messages,
    })))
}
