//! Server configuration loaded from TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default SQLite database filename.
pub const DATABASE_FILE: &str = "podbay.db";

/// Top-level server configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind configuration.
    pub server: HttpConfig,
    /// LLM provider configuration.
    pub llm: LlmConfig,
    /// Web search tool configuration.
    pub search: SearchConfig,
    /// Transcript database configuration.
    pub database: DatabaseConfig,
    /// Bearer token table.
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from a TOML file and expand `${ENV_VAR}`
    /// references in credential fields.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut config: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing config from {}", path.display()))?;

        config.llm.api_key = expand_env(&config.llm.api_key);
        config.search.api_key = expand_env(&config.search.api_key);
        Ok(config)
    }

    /// The address the HTTP server binds to.
    pub fn bind_address(&self) -> String {
        self.server
            .bind
            .clone()
            .unwrap_or_else(|| "127.0.0.1:3000".to_owned())
    }

    /// Path of the transcript database.
    pub fn database_path(&self) -> &str {
        self.database.path.as_deref().unwrap_or(DATABASE_FILE)
    }
}

/// HTTP server configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Custom bind address. When `None`, defaults to `127.0.0.1:3000`.
    pub bind: Option<String>,
}

/// LLM provider configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier.
    pub model: String,
    /// API key (supports `${ENV_VAR}` expansion).
    pub api_key: String,
    /// Optional base URL override for the provider endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            api_key: "${GOOGLE_API_KEY}".into(),
            base_url: None,
        }
    }
}

/// Web search tool configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// API key (supports `${ENV_VAR}` expansion).
    pub api_key: String,
    /// Optional base URL override for the search endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: "${TAVILY_API_KEY}".into(),
            base_url: None,
        }
    }
}

/// Transcript database configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Custom database path. When `None`, defaults to `podbay.db`.
    pub path: Option<String>,
}

/// Bearer token table.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted bearer tokens.
    pub tokens: Vec<TokenEntry>,
}

/// One accepted bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenEntry {
    /// The bearer token value.
    pub token: String,
    /// The user this token authenticates as.
    pub user: String,
    /// Whether the user's email is verified.
    #[serde(default = "default_verified")]
    pub verified: bool,
}

fn default_verified() -> bool {
    true
}

/// Expand a `${ENV_VAR}` reference; other values pass through unchanged.
fn expand_env(value: &str) -> String {
    match value.strip_prefix("${").and_then(|v| v.strip_suffix('}')) {
        Some(name) => std::env::var(name).unwrap_or_default(),
        None => value.to_owned(),
    }
}
