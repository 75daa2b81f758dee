//! Web search capability.
//!
//! Wraps the Tavily search API. The client is stateless and shared
//! read-only across concurrent requests; a failed search folds into the
//! tool result so the model can react instead of killing the turn.

use llm::Tool;
use runtime::ToolError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The tool name the model calls.
pub const TOOL_NAME: &str = "webSearch";

/// Default search endpoint.
const ENDPOINT: &str = "https://api.tavily.com/search";

/// How many hits to request per search.
const MAX_RESULTS: u32 = 5;

/// Arguments the model passes to `webSearch`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// What to search for.
    pub query: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Outbound search client.
#[derive(Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl SearchClient {
    /// Create a client with the given API key.
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: ENDPOINT.to_owned(),
        }
    }

    /// Override the endpoint (self-hosted proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The tool schema advertised to the model.
    pub fn tool() -> Tool {
        Tool::new(
            TOOL_NAME,
            "search the web",
            schemars::schema_for!(SearchArgs),
        )
    }

    /// Entry point for the runtime registry: parse the raw argument JSON,
    /// run the search, and format the hits for the model.
    pub async fn invoke(&self, arguments: &str) -> Result<String, ToolError> {
        let args: SearchArgs =
            serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArgs {
                name: TOOL_NAME.into(),
                reason: e.to_string(),
            })?;
        self.search(&args.query).await
    }

    /// Run one search and return a compact text block of results.
    pub async fn search(&self, query: &str) -> Result<String, ToolError> {
        tracing::debug!("searching the web for: {query}");

        let body = SearchRequest {
            api_key: &self.api_key,
            query,
            max_results: MAX_RESULTS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(failed(format!("search api error {status}: {text}")));
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| failed(e.to_string()))?;
        Ok(format_results(query, &parsed))
    }
}

fn failed(reason: String) -> ToolError {
    ToolError::Failed {
        name: TOOL_NAME.into(),
        reason,
    }
}

/// Format the response as a text block the model can quote from.
fn format_results(query: &str, response: &SearchResponse) -> String {
    let mut out = String::new();

    if let Some(answer) = response.answer.as_deref().filter(|a| !a.is_empty()) {
        out.push_str(answer);
        out.push('\n');
    }

    for hit in &response.results {
        out.push_str(&format!("- {} ({})\n  {}\n", hit.title, hit.url, hit.content));
    }

    if out.is_empty() {
        out = format!("no results for '{query}'");
    }
    out
}
