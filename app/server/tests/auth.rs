//! Token authenticator tests.

use podbay_server::{
    Authenticator, TokenAuthenticator,
    config::{AuthConfig, TokenEntry},
};

fn authenticator() -> TokenAuthenticator {
    TokenAuthenticator::from_config(&AuthConfig {
        tokens: vec![
            TokenEntry {
                token: "alice-token".into(),
                user: "alice".into(),
                verified: true,
            },
            TokenEntry {
                token: "mallory-token".into(),
                user: "mallory".into(),
                verified: false,
            },
        ],
    })
}

#[tokio::test]
async fn known_token_resolves_identity() {
    let identity = authenticator().authenticate("alice-token").await.unwrap();
    assert_eq!(identity.user_id, "alice");
    assert!(identity.verified);
}

#[tokio::test]
async fn unverified_flag_is_carried() {
    let identity = authenticator()
        .authenticate("mallory-token")
        .await
        .unwrap();
    assert!(!identity.verified);
}

#[tokio::test]
async fn unknown_and_empty_tokens_are_rejected() {
    assert!(authenticator().authenticate("wrong").await.is_err());
    assert!(authenticator().authenticate("").await.is_err());
}

#[test]
fn title_derivation_truncates_and_falls_back() {
    use podbay_server::routes::derive_title;

    assert_eq!(derive_title("Hello"), "Hello");
    assert_eq!(derive_title(""), "New chat");
    assert_eq!(derive_title("   "), "New chat");

    let long = "Plan my trip to Jupiter and beyond the infinite";
    let title = derive_title(long);
    assert_eq!(title.chars().count(), 30);
    assert!(long.starts_with(title));
}
