//! Request body construction tests.

use llm::{Config, General, Message, Tool, ToolChoice};
use podbay_gemini::Request;

fn search_tool() -> Tool {
    Tool::new("webSearch", "search the web", schemars::schema_for!(String))
}

#[test]
fn defaults_mirror_general_config() {
    let request = Request::from(General::default());
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], "gemini-2.5-flash");
    assert_eq!(json["temperature"], 0.0);
    assert_eq!(json["stream"], false);
    // No tools advertised: neither tools nor tool_choice on the wire.
    assert!(json.get("tools").is_none());
    assert!(json.get("tool_choice").is_none());
    assert!(json.get("max_retries").is_none());
}

#[test]
fn tools_serialize_as_function_entries() {
    let request = Request::from(General::default())
        .with_tools(vec![search_tool()])
        .with_tool_choice(ToolChoice::Auto);
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["tools"][0]["type"], "function");
    assert_eq!(json["tools"][0]["function"]["name"], "webSearch");
    assert_eq!(json["tool_choice"], "auto");
}

#[test]
fn final_round_serializes_tool_choice_none() {
    let request = Request::from(General::default())
        .with_tools(vec![search_tool()])
        .with_tool_choice(ToolChoice::None);
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["tool_choice"], "none");
}

#[test]
fn messages_replaces_the_transcript() {
    let request = Request::from(General::default());
    let filled = request.messages(&[Message::system("prompt"), Message::user("hi")]);
    let json = serde_json::to_value(&filled).unwrap();

    assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][1]["content"], "hi");
}

#[test]
fn stream_mode_sets_flags() {
    let mut config = General::default();
    config.usage = true;
    let request = Request::from(config).stream_mode();
    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["stream"], true);
    assert_eq!(json["stream_options"]["include_usage"], true);
}
