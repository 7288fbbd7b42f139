//! Mock OIDC provider for development and testing.
//!
//! Authorization codes are base64-encoded JSON carrying the identity the
//! "provider" asserts, as issued by the Mock IdP server.

use async_trait::async_trait;
use base64::Engine;
use gatehouse_core::auth::{
    AuthError, IdentityProvider, OidcProvider, ProviderIdentity, Result, SignInPolicy,
};
use gatehouse_core::identity::TokenSet;
use serde::{Deserialize, Serialize};
use url::Url;

/// Identity carried inside a mock authorization code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockIdentity {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub access_token: Option<String>,
}

impl MockIdentity {
    /// Encode this identity as a mock authorization code.
    pub fn to_code(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }
}

/// Mock OIDC provider that works with `MockIdpServer`.
pub struct MockProvider {
    provider: OidcProvider,
    mock_idp_url: Url,
    redirect_uri: Url,
    policy: SignInPolicy,
}

impl MockProvider {
    /// Create a new MockProvider.
    ///
    /// # Arguments
    /// * `provider` - The OIDC provider to simulate
    /// * `mock_idp_url` - The URL of the Mock IdP server (e.g., http://localhost:3001)
    /// * `redirect_uri` - The callback URL for the main app
    pub fn new(provider: OidcProvider, mock_idp_url: Url, redirect_uri: Url) -> Self {
        Self {
            provider,
            mock_idp_url,
            redirect_uri,
            policy: SignInPolicy::Reconcile,
        }
    }

    /// Use a different sign-in policy than the default `Reconcile`.
    pub fn with_policy(mut self, policy: SignInPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn authorization_url(&self, state: &str, _pkce_challenge: &str) -> Result<Url> {
        let mut url = self
            .mock_idp_url
            .join(&format!("/{}/authorize", self.provider))
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        url.query_pairs_mut()
            .append_pair("state", state)
            .append_pair("redirect_uri", self.redirect_uri.as_str());

        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _pkce_verifier: &str) -> Result<ProviderIdentity> {
        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let identity: MockIdentity =
            serde_json::from_slice(&decoded).map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        if identity.sub.is_empty() {
            return Err(AuthError::MissingClaim("sub".to_string()));
        }

        Ok(ProviderIdentity {
            provider: self.provider,
            provider_account_id: identity.sub,
            email: identity.email,
            name: identity.name,
            image: identity.picture,
            tokens: TokenSet {
                access_token: identity.access_token,
                token_type: Some("bearer".to_string()),
                scope: Some("openid email profile".to_string()),
                ..Default::default()
            },
        })
    }

    fn provider(&self) -> OidcProvider {
        self.provider
    }

    fn sign_in_policy(&self) -> SignInPolicy {
        self.policy
    }
}
