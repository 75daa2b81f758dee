//! Wire-format tests for messages, responses, and stream chunks.

use podbay_llm::{FinishReason, Message, Response, StreamChunk};

#[test]
fn user_message_serializes_minimal() {
    let json = serde_json::to_value(Message::user("hello")).unwrap();
    assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));
}

#[test]
fn tool_message_serializes_call_id() {
    let json = serde_json::to_value(Message::tool("result", "call_1")).unwrap();
    assert_eq!(json["role"], "tool");
    assert_eq!(json["tool_call_id"], "call_1");
}

#[test]
fn assistant_tool_call_round_trips() {
    let raw = serde_json::json!({
        "role": "assistant",
        "tool_calls": [{
            "id": "call_1",
            "type": "function",
            "function": {"name": "webSearch", "arguments": "{\"query\":\"weather\"}"}
        }]
    });

    let message: Message = serde_json::from_value(raw).unwrap();
    assert!(message.content.is_empty());
    assert_eq!(message.tool_calls[0].function.name, "webSearch");
}

#[test]
fn response_parses_tool_call_finish() {
    let raw = serde_json::json!({
        "id": "cmpl-1",
        "object": "chat.completion",
        "created": 1700000000u64,
        "model": "gemini-2.5-flash",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "webSearch", "arguments": "{}"}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    });

    let response: Response = serde_json::from_value(raw).unwrap();
    assert_eq!(response.reason(), Some(&FinishReason::ToolCalls));
    assert_eq!(response.tool_calls().unwrap().len(), 1);

    let message = response.message().unwrap();
    assert_eq!(message.tool_calls.len(), 1);
}

#[test]
fn stream_chunk_parses_delta() {
    let raw = serde_json::json!({
        "id": "cmpl-1",
        "object": "chat.completion.chunk",
        "created": 1700000000u64,
        "model": "gemini-2.5-flash",
        "choices": [{
            "index": 0,
            "delta": {"content": "Good"},
            "finish_reason": null
        }]
    });

    let chunk: StreamChunk = serde_json::from_value(raw).unwrap();
    assert_eq!(chunk.content(), Some("Good"));
    assert!(chunk.reason().is_none());
}

#[test]
fn stream_chunk_parses_stop() {
    let raw = serde_json::json!({
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
    });

    let chunk: StreamChunk = serde_json::from_value(raw).unwrap();
    assert!(chunk.content().is_none());
    assert_eq!(chunk.reason(), Some(&FinishReason::Stop));
}
