//! Authentication interface for the server.
//!
//! Identity is an external collaborator: podbay never implements sign-in
//! or verification flows, it only checks the credential attached to a
//! request. Concrete implementations live in separate files.

use compact_str::CompactString;
use thiserror::Error;

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Stable identifier of the user, as issued by the identity provider.
    pub user_id: CompactString,
    /// Whether the identity provider has verified this user's email.
    pub verified: bool,
}

/// Authentication error.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The provided token is missing, invalid, or unknown.
    #[error("invalid or unknown token")]
    InvalidToken,
}

/// Trait for authenticating requests.
///
/// Uses RPITIT, no dyn dispatch.
pub trait Authenticator: Send + Sync {
    /// Verify a bearer token and return the caller's identity.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Identity, AuthError>> + Send;
}
