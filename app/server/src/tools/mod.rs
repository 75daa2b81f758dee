//! Tool capabilities available to the agent.

pub mod search;

pub use search::SearchClient;
