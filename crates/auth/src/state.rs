//! Application state for auth.

use std::sync::Arc;

use gatehouse_core::auth::{AuthFlowRepository, IdentityProvider, OidcProvider, RouteGate};
use gatehouse_core::storage::UserRepository;

use crate::config::AuthConfig;
use crate::enrich::SessionEnricher;
use crate::error::AuthError;
use crate::providers::GoogleProvider;
use crate::reconcile::SignInReconciler;
use crate::token::SessionCodec;

/// Shared state for auth handlers and the route-gate middleware.
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserRepository>,
    pub flows: Arc<dyn AuthFlowRepository>,
    pub config: AuthConfig,
    pub gate: RouteGate,
    pub codec: SessionCodec,
    google: Option<Arc<dyn IdentityProvider>>,
}

impl AuthState {
    /// Creates a new AuthState and discovers the Google OIDC provider.
    ///
    /// # Errors
    ///
    /// Returns an error if provider initialization fails (e.g., OIDC discovery).
    pub async fn new(
        users: Arc<dyn UserRepository>,
        flows: Arc<dyn AuthFlowRepository>,
        config: AuthConfig,
    ) -> Result<Self, AuthError> {
        let google = GoogleProvider::new(&config.google).await?;

        Ok(Self::without_providers(users, flows, config).with_google(Arc::new(google)))
    }

    /// Creates an AuthState with no provider clients; add them with
    /// [`AuthState::with_google`].
    pub fn without_providers(
        users: Arc<dyn UserRepository>,
        flows: Arc<dyn AuthFlowRepository>,
        config: AuthConfig,
    ) -> Self {
        let codec = SessionCodec::new(&config.secret, config.session_ttl);

        Self {
            users,
            flows,
            config,
            gate: RouteGate::default(),
            codec,
            google: None,
        }
    }

    /// Use `client` for Google sign-ins (the mock provider in development).
    pub fn with_google(mut self, client: Arc<dyn IdentityProvider>) -> Self {
        self.google = Some(client);
        self
    }

    /// Replace the route gate.
    pub fn with_gate(mut self, gate: RouteGate) -> Self {
        self.gate = gate;
        self
    }

    /// Gets the provider client for the given OIDC provider.
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotConfigured` if the provider is not enabled.
    pub fn get_provider(&self, provider: OidcProvider) -> Result<&dyn IdentityProvider, AuthError> {
        match provider {
            OidcProvider::Google => self
                .google
                .as_deref()
                .ok_or_else(|| AuthError::ProviderNotConfigured(provider.to_string())),
        }
    }

    /// Providers with a configured client, in display order.
    pub fn configured_providers(&self) -> Vec<OidcProvider> {
        OidcProvider::ALL
            .into_iter()
            .filter(|p| self.get_provider(*p).is_ok())
            .collect()
    }

    pub fn reconciler(&self) -> SignInReconciler {
        SignInReconciler::new(self.users.clone())
    }

    pub fn enricher(&self) -> SessionEnricher {
        SessionEnricher::new(self.users.clone())
    }
}
