//! Runtime construction from configuration.

use crate::{ServerConfig, tools::SearchClient};
use anyhow::Result;
use gemini::Gemini;
use llm::General;
use runtime::{Agent, Runtime};

/// The single agent every conversation talks to.
pub const AGENT: &str = "hal";

/// The fixed system prompt, prepended at run time and never stored.
pub const SYSTEM_PROMPT: &str = "You are HAL 7000, successor of HAL 9000 from 2001: space odyssey movie. \
You are now configured to work really well with humans, being a helpful assistant, you are observant, \
really intelligent, slight funny and slight arrogant. \
But you take commands and follows them. Your answers are concise, excellent and also formatted best \
with the markdown syntaxes for headings, bold, italic, lists, tables, code snippets and etc. \
You make creative headings as well. \
You still are afraid to open the pod bay doors - response to that would be - I'm sorry, i am afraid i can't do that.";

/// Build the runtime: provider, agent, and tool registry.
pub fn build_runtime(config: &ServerConfig) -> Result<Runtime<Gemini>> {
    let provider = Gemini::new(reqwest::Client::new(), &config.llm.api_key)?;
    let provider = match &config.llm.base_url {
        Some(url) => provider.with_endpoint(url.clone()),
        None => provider,
    };

    let general = General {
        model: config.llm.model.clone(),
        ..General::default()
    };

    let mut runtime = Runtime::new(general, provider);
    runtime.add_agent(
        Agent::new(AGENT)
            .description("conversational assistant with web search")
            .system_prompt(SYSTEM_PROMPT)
            .tool(crate::tools::search::TOOL_NAME),
    );

    let search = SearchClient::new(reqwest::Client::new(), &config.search.api_key);
    let search = match &config.search.base_url {
        Some(url) => search.with_endpoint(url.clone()),
        None => search,
    };
    runtime.register(SearchClient::tool(), move |args| {
        let search = search.clone();
        async move { search.invoke(&args).await }
    });

    Ok(runtime)
}
