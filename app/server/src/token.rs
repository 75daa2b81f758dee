//! Static token authenticator.
//!
//! Simple lookup-based authentication mapping bearer tokens to user
//! identities from configuration.

use crate::{
    auth::{AuthError, Authenticator, Identity},
    config::AuthConfig,
};
use compact_str::CompactString;
use std::collections::BTreeMap;

/// Authenticates requests via static token lookup.
pub struct TokenAuthenticator {
    /// Map from bearer token to identity.
    tokens: BTreeMap<CompactString, Identity>,
}

impl TokenAuthenticator {
    /// Create from a map of token -> identity pairs.
    pub fn new(tokens: BTreeMap<CompactString, Identity>) -> Self {
        Self { tokens }
    }

    /// Create from [`AuthConfig`].
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|entry| {
                (
                    CompactString::new(&entry.token),
                    Identity {
                        user_id: CompactString::new(&entry.user),
                        verified: entry.verified,
                    },
                )
            })
            .collect();
        Self { tokens }
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Identity, AuthError>> + Send {
        let result = self
            .tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken);
        std::future::ready(result)
    }
}
