//! Shared application state for the HTTP server.

use crate::auth::Authenticator;
use llm::LLM;
use runtime::Runtime;
use std::sync::Arc;
use store::TranscriptStore;

/// Shared state available to all request handlers.
pub struct AppState<P: LLM, A: Authenticator> {
    /// The podbay runtime (immutable after init).
    pub runtime: Arc<Runtime<P>>,
    /// Transcript store.
    pub store: Arc<TranscriptStore>,
    /// Authenticator.
    pub authenticator: Arc<A>,
}

impl<P: LLM, A: Authenticator> Clone for AppState<P, A> {
    fn clone(&self) -> Self {
        Self {
            runtime: Arc::clone(&self.runtime),
            store: Arc::clone(&self.store),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}
