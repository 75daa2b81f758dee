//! Configuration loading tests.

use podbay_server::ServerConfig;
use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn defaults_are_sensible() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_address(), "127.0.0.1:3000");
    assert_eq!(config.database_path(), "podbay.db");
    assert_eq!(config.llm.model, "gemini-2.5-flash");
    assert!(config.auth.tokens.is_empty());
}

#[test]
fn loads_a_full_config() {
    let file = write_config(
        r#"
        [server]
        bind = "0.0.0.0:8080"

        [llm]
        model = "gemini-2.5-pro"
        api_key = "literal-key"

        [search]
        api_key = "tvly-key"

        [database]
        path = "/var/lib/podbay/podbay.db"

        [[auth.tokens]]
        token = "alice-token"
        user = "alice"

        [[auth.tokens]]
        token = "mallory-token"
        user = "mallory"
        verified = false
        "#,
    );

    let config = ServerConfig::load(file.path()).unwrap();
    assert_eq!(config.bind_address(), "0.0.0.0:8080");
    assert_eq!(config.llm.model, "gemini-2.5-pro");
    assert_eq!(config.llm.api_key, "literal-key");
    assert_eq!(config.database_path(), "/var/lib/podbay/podbay.db");
    assert_eq!(config.auth.tokens.len(), 2);
    assert!(config.auth.tokens[0].verified);
    assert!(!config.auth.tokens[1].verified);
}

#[test]
fn expands_env_references_in_credentials() {
    // Process-global env; pick names no other test uses.
    unsafe {
        std::env::set_var("PODBAY_TEST_LLM_KEY", "from-env");
    }

    let file = write_config(
        r#"
        [llm]
        api_key = "${PODBAY_TEST_LLM_KEY}"

        [search]
        api_key = "${PODBAY_TEST_MISSING_KEY}"
        "#,
    );

    let config = ServerConfig::load(file.path()).unwrap();
    assert_eq!(config.llm.api_key, "from-env");
    // Unset variables expand to empty rather than erroring at load time.
    assert_eq!(config.search.api_key, "");
}

#[test]
fn missing_file_is_an_error() {
    assert!(ServerConfig::load("/nonexistent/podbay.toml").is_err());
}
