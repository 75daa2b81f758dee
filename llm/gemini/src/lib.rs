//! Gemini LLM provider.
//!
//! Talks to Gemini through its OpenAI-compatible chat-completions
//! endpoint, so the shared wire types in [`llm`] apply unchanged.

pub use request::Request;

use anyhow::Result;
use reqwest::{
    Client,
    header::{self, HeaderMap},
};

mod provider;
mod request;

/// The OpenAI-compatible Gemini chat completions endpoint.
const ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// The Gemini LLM provider
#[derive(Clone)]
pub struct Gemini {
    /// The HTTP client
    client: Client,

    /// The request headers
    headers: HeaderMap,

    /// The chat completions endpoint
    endpoint: String,
}

impl Gemini {
    /// Create a new provider with the given API key.
    pub fn new(client: Client, key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse()?);
        headers.insert(header::ACCEPT, "application/json".parse()?);
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: ENDPOINT.to_owned(),
        })
    }

    /// Override the endpoint (self-hosted proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
