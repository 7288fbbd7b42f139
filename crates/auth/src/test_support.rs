//! Shared fixtures for router-level tests.

use std::sync::Arc;

use gatehouse_core::auth::{OidcProvider, ProviderIdentity};
use gatehouse_core::identity::TokenSet;
use url::Url;

use crate::config::AuthConfig;
use crate::flows::InMemoryFlowStore;
use crate::providers::MockProvider;
use crate::storage::InMemoryUserStore;
use crate::AuthState;

pub(crate) fn test_config() -> AuthConfig {
    AuthConfig::new(
        "http://localhost:3000".parse().unwrap(),
        "client-id",
        "client-secret",
        "test-secret",
    )
    .unwrap()
}

pub(crate) fn mock_provider(config: &AuthConfig) -> MockProvider {
    MockProvider::new(
        OidcProvider::Google,
        Url::parse("http://localhost:3001").unwrap(),
        config.google.redirect_uri.clone(),
    )
}

/// AuthState over in-memory stores with the mock Google provider.
pub(crate) fn test_state(users: &InMemoryUserStore) -> AuthState {
    let config = test_config();
    let google = mock_provider(&config);

    AuthState::without_providers(
        Arc::new(users.clone()),
        Arc::new(InMemoryFlowStore::new()),
        config,
    )
    .with_google(Arc::new(google))
}

pub(crate) fn identity(email: &str) -> ProviderIdentity {
    ProviderIdentity {
        provider: OidcProvider::Google,
        provider_account_id: format!("mock-google-{email}"),
        email: Some(email.to_string()),
        name: Some("Ada Lovelace".to_string()),
        image: None,
        tokens: TokenSet::default(),
    }
}

/// `Cookie` header value carrying a fresh session for `email`.
pub(crate) fn session_cookie(state: &AuthState, email: &str) -> String {
    let token = state.codec.issue(&identity(email)).unwrap();
    format!("{}={}", state.config.cookie_name, token)
}
