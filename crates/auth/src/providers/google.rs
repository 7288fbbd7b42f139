//! Google OIDC provider implementation.

use async_trait::async_trait;
use chrono::Utc;
use gatehouse_core::auth::{
    generate_state, AuthError, IdentityProvider, OidcProvider, ProviderIdentity, Result,
};
use gatehouse_core::identity::TokenSet;
use openidconnect::{
    core::{CoreAuthenticationFlow, CoreClient, CoreProviderMetadata},
    reqwest, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointMaybeSet, EndpointSet,
    IssuerUrl, Nonce, OAuth2TokenResponse, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse,
};
use url::Url;

use crate::config::ProviderConfig;

const SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// `CoreClient` as returned by `from_provider_metadata` plus a redirect URI.
///
/// Auth URL is always set by discovery; token and userinfo URLs may or may
/// not be; device, introspection and revocation URLs are never set.
type ConfiguredCoreClient = CoreClient<
    EndpointSet,
    openidconnect::EndpointNotSet,
    openidconnect::EndpointNotSet,
    openidconnect::EndpointNotSet,
    EndpointMaybeSet,
    EndpointMaybeSet,
>;

/// Google OIDC provider.
pub struct GoogleProvider {
    client: ConfiguredCoreClient,
    http_client: reqwest::Client,
}

impl GoogleProvider {
    /// Create a new Google provider by discovering the OIDC metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The issuer URL is invalid
    /// - Discovery fails (network error or invalid metadata)
    /// - The redirect URI is invalid
    pub async fn new(config: &ProviderConfig) -> Result<Self> {
        let issuer_url = IssuerUrl::new("https://accounts.google.com".to_string())
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        // Redirects must not be followed during discovery and code exchange
        let http_client = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        let provider_metadata = CoreProviderMetadata::discover_async(issuer_url, &http_client)
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        let client = CoreClient::from_provider_metadata(
            provider_metadata,
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_uri.to_string())
                .map_err(|e| AuthError::Provider(e.to_string()))?,
        );

        tracing::info!(client_id = %config.client_id, "Google OIDC provider discovered");

        Ok(Self {
            client,
            http_client,
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    async fn authorization_url(&self, state: &str, pkce_challenge: &str) -> Result<Url> {
        let state_owned = state.to_string();
        let pkce_challenge_owned = pkce_challenge.to_string();

        // The challenge is computed by the caller, who keeps the verifier in the flow store.
        let mut request = self.client.authorize_url(
            CoreAuthenticationFlow::AuthorizationCode,
            move || CsrfToken::new(state_owned),
            || Nonce::new(generate_state()),
        );
        for scope in SCOPES {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, _csrf_token, _nonce) = request
            .add_extra_param("code_challenge", pkce_challenge_owned)
            .add_extra_param("code_challenge_method", "S256")
            .url();

        Ok(auth_url)
    }

    async fn exchange_code(&self, code: &str, pkce_verifier: &str) -> Result<ProviderIdentity> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        let id_token = token_response
            .id_token()
            .ok_or_else(|| AuthError::InvalidToken("No ID token in response".to_string()))?;

        let claims = id_token
            .claims(&self.client.id_token_verifier(), |_: Option<&Nonce>| Ok(()))
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let scope = match token_response.scopes() {
            Some(scopes) => scopes
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            None => SCOPES.join(" "),
        };

        let tokens = TokenSet {
            access_token: Some(token_response.access_token().secret().to_string()),
            refresh_token: token_response
                .refresh_token()
                .map(|t| t.secret().to_string()),
            expires_at: token_response
                .expires_in()
                .map(|ttl| Utc::now().timestamp() + ttl.as_secs() as i64),
            token_type: serialized_str(token_response.token_type()).map(|t| t.to_lowercase()),
            scope: Some(scope),
            id_token: serialized_str(id_token),
            session_state: None,
        };

        Ok(ProviderIdentity {
            provider: OidcProvider::Google,
            provider_account_id: claims.subject().to_string(),
            email: claims.email().map(|e| e.to_string()),
            name: claims
                .name()
                .and_then(|n| n.get(None))
                .map(|n| n.to_string()),
            image: claims
                .picture()
                .and_then(|p| p.get(None))
                .map(|p| p.to_string()),
            tokens,
        })
    }

    fn provider(&self) -> OidcProvider {
        OidcProvider::Google
    }
}

/// String form of a value that serializes as a JSON string (token types, raw JWTs).
fn serialized_str<T: serde::Serialize>(value: &T) -> Option<String> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Some(s),
        _ => None,
    }
}
