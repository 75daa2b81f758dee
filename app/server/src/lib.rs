//! Podbay server — application shell composing the runtime, transcript
//! store, authentication, and the streaming chat endpoints.

pub mod auth;
pub mod builder;
pub mod config;
pub mod error;
pub mod routes;
pub mod serve;
pub mod state;
pub mod stream;
pub mod token;
pub mod tools;

pub use auth::{AuthError, Authenticator, Identity};
pub use builder::{AGENT, SYSTEM_PROMPT, build_runtime};
pub use config::ServerConfig;
pub use serve::{ServeHandle, serve};
pub use state::AppState;
pub use stream::{ERROR_MARKER, TurnEvent, turn_stream};
pub use token::TokenAuthenticator;
