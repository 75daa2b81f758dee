//! End-to-end HTTP tests: a scripted provider behind the real router.

use llm::{FinishReason, FunctionCall, General, ScriptedProvider, StreamChunk, Tool, ToolCall};
use podbay_server::{
    AGENT, AppState, SYSTEM_PROMPT, TokenAuthenticator,
    config::{AuthConfig, TokenEntry},
    routes,
};
use runtime::{Agent, Runtime};
use std::sync::Arc;
use store::TranscriptStore;

struct TestApp {
    port: u16,
    store: Arc<TranscriptStore>,
    provider: ScriptedProvider,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        tokens: vec![
            TokenEntry {
                token: "alice-token".into(),
                user: "alice".into(),
                verified: true,
            },
            TokenEntry {
                token: "bob-token".into(),
                user: "bob".into(),
                verified: true,
            },
            TokenEntry {
                token: "mallory-token".into(),
                user: "mallory".into(),
                verified: false,
            },
        ],
    }
}

async fn spawn_app() -> TestApp {
    let provider = ScriptedProvider::new();
    let store = Arc::new(TranscriptStore::in_memory().unwrap());

    let mut runtime = Runtime::new(General::default(), provider.clone());
    runtime.add_agent(
        Agent::new(AGENT)
            .system_prompt(SYSTEM_PROMPT)
            .tool("webSearch"),
    );
    runtime.register(
        Tool::new("webSearch", "search the web", schemars::schema_for!(String)),
        |args| async move { Ok(format!("search results: {args}")) },
    );

    let state = AppState {
        runtime: Arc::new(runtime),
        store: Arc::clone(&store),
        authenticator: Arc::new(TokenAuthenticator::from_config(&auth_config())),
    };

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move { axum::serve(listener, app).await });

    TestApp {
        port,
        store,
        provider,
        client: reqwest::Client::new(),
    }
}

/// Parse `data: <JSON>` frames out of an SSE body.
fn frames(body: &str) -> Vec<serde_json::Value> {
    body.split("\n\n")
        .filter_map(|frame| frame.trim().strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).unwrap())
        .collect()
}

#[tokio::test]
async fn hello_turn_streams_meta_then_content_and_persists_both_rows() {
    let app = spawn_app().await;
    app.provider.push_turn(vec![
        StreamChunk::content_delta("Good afternoon. "),
        StreamChunk::content_delta("How can I help?"),
        StreamChunk::finish(FinishReason::Stop),
    ]);

    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({"message": "Hello"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );

    let body = response.text().await.unwrap();
    let frames = frames(&body);

    // First frame carries a well-formed conversation id.
    let convo_id = frames[0]["convoId"].as_str().unwrap().to_owned();
    assert!(uuid::Uuid::parse_str(&convo_id).is_ok());

    // Remaining frames are deltas; their concatenation is the greeting.
    let answer: String = frames[1..]
        .iter()
        .map(|f| f["content"].as_str().unwrap())
        .collect();
    assert_eq!(answer, "Good afternoon. How can I help?");

    // Both rows are durable, tagged with the same conversation.
    let history = app.store.history(&convo_id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, store::Role::User);
    assert_eq!(history[0].content, "Hello");
    assert_eq!(history[1].role, store::Role::Assistant);
    assert_eq!(history[1].content, answer);

    // The conversation title derives from the first message.
    let listed = app.store.list_conversations("alice").unwrap();
    assert_eq!(listed[0].title, "Hello");
}

#[tokio::test]
async fn continued_conversation_feeds_prior_turns_to_the_model() {
    let app = spawn_app().await;
    let convo = app.store.create_conversation("alice", "Hello").unwrap();
    app.store
        .append_message(&convo.id, store::Role::User, "Hello")
        .unwrap();
    app.store
        .append_message(&convo.id, store::Role::Assistant, "Good afternoon.")
        .unwrap();

    app.provider.push_turn(vec![
        StreamChunk::content_delta("As I said, good afternoon."),
        StreamChunk::finish(FinishReason::Stop),
    ]);

    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({
            "message": "What did you just say?",
            "conversationId": convo.id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    response.text().await.unwrap();

    // Exactly one system prompt, first; then the two prior turns; then
    // the new user message.
    let invocation = &app.provider.invocations()[0];
    let roles: Vec<_> = invocation.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [
            llm::Role::System,
            llm::Role::User,
            llm::Role::Assistant,
            llm::Role::User
        ]
    );
    assert_eq!(invocation.messages[0].content, SYSTEM_PROMPT);
    assert_eq!(invocation.messages[3].content, "What did you just say?");
}

#[tokio::test]
async fn tool_round_trip_stays_invisible_on_the_wire() {
    let app = spawn_app().await;
    app.provider.push_turn(vec![
        StreamChunk::tool(&[ToolCall {
            id: "call_1".into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "webSearch".into(),
                arguments: "{\"query\":\"weather\"}".into(),
            },
            ..Default::default()
        }]),
        StreamChunk::finish(FinishReason::ToolCalls),
    ]);
    app.provider.push_turn(vec![
        StreamChunk::content_delta("Sunny, 21C."),
        StreamChunk::finish(FinishReason::Stop),
    ]);

    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({"message": "Weather in Singapore?"}))
        .send()
        .await
        .unwrap();
    let body = response.text().await.unwrap();

    // No frame carries the tool result.
    assert!(!body.contains("search results"));

    // The tool result reached the model before its second invocation.
    let second = &app.provider.invocations()[1];
    let last = second.messages.last().unwrap();
    assert_eq!(last.role, llm::Role::Tool);
    assert_eq!(last.tool_call_id, "call_1");
}

#[tokio::test]
async fn chat_request_validation_and_auth() {
    let app = spawn_app().await;

    // Missing message.
    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    // No token.
    let response = app
        .client
        .post(app.url("/api/chat"))
        .json(&serde_json::json!({"message": "Hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Unverified identity.
    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer mallory-token")
        .json(&serde_json::json!({"message": "Hello"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn chat_rejects_foreign_and_malformed_conversations() {
    let app = spawn_app().await;
    let convo = app.store.create_conversation("alice", "private").unwrap();

    // Bob cannot append to Alice's conversation.
    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer bob-token")
        .json(&serde_json::json!({"message": "hi", "conversationId": convo.id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Garbage ids are rejected before touching the store.
    let response = app
        .client
        .post(app.url("/api/chat"))
        .header("Authorization", "Bearer bob-token")
        .json(&serde_json::json!({"message": "hi", "conversationId": "not-a-uuid"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn conversation_create_list_delete_round_trip() {
    let app = spawn_app().await;

    // Create ahead of the first turn.
    let response = app
        .client
        .post(app.url("/api/conversation"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({"message": "Plan my trip to Jupiter and beyond"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let id = body["message"].as_str().unwrap().to_owned();
    assert!(uuid::Uuid::parse_str(&id).is_ok());

    // Title is capped at 30 characters.
    let listed = app.store.list_conversations("alice").unwrap();
    assert_eq!(listed[0].title.chars().count(), 30);

    // List returns it.
    let response = app
        .client
        .get(app.url("/api/conversation"))
        .header("Authorization", "Bearer alice-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Listing with no conversations is a 400, not an empty list.
    let response = app
        .client
        .get(app.url("/api/conversation"))
        .header("Authorization", "Bearer bob-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Delete it.
    let response = app
        .client
        .delete(app.url("/api/conversation"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({"conversationId": id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(app.store.list_conversations("alice").unwrap().is_empty());

    // Deleting again is a 400.
    let response = app
        .client
        .delete(app.url("/api/conversation"))
        .header("Authorization", "Bearer alice-token")
        .json(&serde_json::json!({"conversationId": id}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn history_pagination_walks_to_a_404() {
    let app = spawn_app().await;
    let convo = app.store.create_conversation("alice", "t").unwrap();
    for i in 0..5 {
        app.store
            .append_message(&convo.id, store::Role::User, &format!("m{i}"))
            .unwrap();
    }

    // First page: 3 newest, newest first.
    let response = app
        .client
        .get(app.url("/api/conversation/messages"))
        .query(&[("conversationId", convo.id.as_str()), ("limit", "3")])
        .header("Authorization", "Bearer alice-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let page = body["message"].as_array().unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0]["content"], "m4");
    assert_eq!(page[2]["content"], "m2");

    // Next page via the oldest loaded message's timestamp.
    let cursor = page[2]["createdAt"].as_i64().unwrap().to_string();
    let response = app
        .client
        .get(app.url("/api/conversation/messages"))
        .query(&[
            ("conversationId", convo.id.as_str()),
            ("before", cursor.as_str()),
            ("limit", "3"),
        ])
        .header("Authorization", "Bearer alice-token")
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    let page = body["message"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["content"], "m1");

    // Past the earliest message: 404 means "no more pages".
    let cursor = page[1]["createdAt"].as_i64().unwrap().to_string();
    let response = app
        .client
        .get(app.url("/api/conversation/messages"))
        .query(&[
            ("conversationId", convo.id.as_str()),
            ("before", cursor.as_str()),
            ("limit", "3"),
        ])
        .header("Authorization", "Bearer alice-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn history_is_denied_for_strangers_and_bad_ids() {
    let app = spawn_app().await;
    let convo = app.store.create_conversation("alice", "t").unwrap();
    app.store
        .append_message(&convo.id, store::Role::User, "hello")
        .unwrap();

    // No token: 401 on this endpoint.
    let response = app
        .client
        .get(app.url("/api/conversation/messages"))
        .query(&[("conversationId", convo.id.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Malformed id.
    let response = app
        .client
        .get(app.url("/api/conversation/messages"))
        .query(&[("conversationId", "nope")])
        .header("Authorization", "Bearer alice-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    // Someone else's conversation.
    let response = app
        .client
        .get(app.url("/api/conversation/messages"))
        .query(&[("conversationId", convo.id.as_str())])
        .header("Authorization", "Bearer bob-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}
