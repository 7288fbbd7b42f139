use async_trait::async_trait;
use url::Url;

use super::{AuthError, AuthFlowState, OidcProvider, ProviderIdentity, SignInPolicy};

/// Result type for auth operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Abstraction over OIDC identity providers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Generate authorization URL for user redirect.
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url>;

    /// Exchange an authorization code for the user's identity and tokens.
    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<ProviderIdentity>;

    /// Which provider this client represents.
    fn provider(&self) -> OidcProvider;

    /// How sign-ins through this provider are reconciled with local records.
    fn sign_in_policy(&self) -> SignInPolicy {
        SignInPolicy::Reconcile
    }
}

/// Storage for in-flight auth flows (PKCE verifier keyed by CSRF state).
#[async_trait]
pub trait AuthFlowRepository: Send + Sync {
    /// Store PKCE/state for auth flow.
    async fn store_auth_flow(&self, state: &str, flow: &AuthFlowState) -> Result<()>;

    /// Retrieve and delete auth flow state. A state can only be used once.
    async fn take_auth_flow(&self, state: &str) -> Result<Option<AuthFlowState>>;
}
