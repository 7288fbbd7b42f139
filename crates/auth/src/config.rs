use std::time::Duration;

use gatehouse_core::auth::OidcProvider;
use url::Url;

use crate::error::AuthError;

/// Default name of the session cookie.
pub const DEFAULT_COOKIE_NAME: &str = "gatehouse.session-token";

/// Path of the sign-in page unauthenticated users are sent to.
pub const DEFAULT_SIGNIN_PAGE: &str = "/auth/signin";

/// Configuration for a single OIDC provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
}

/// Complete auth configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub google: ProviderConfig,
    /// Secret used to sign session tokens.
    pub secret: String,
    pub session_ttl: Duration,
    pub base_url: Url,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub signin_page: String,
}

impl AuthConfig {
    /// Build a config with default session and cookie settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider callback URL cannot be derived from `base_url`.
    pub fn new(
        base_url: Url,
        google_client_id: impl Into<String>,
        google_client_secret: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let google = ProviderConfig {
            client_id: google_client_id.into(),
            client_secret: google_client_secret.into(),
            redirect_uri: callback_url(&base_url, OidcProvider::Google)?,
        };

        Ok(Self {
            google,
            secret: secret.into(),
            session_ttl: Duration::from_secs(30 * 24 * 60 * 60),
            cookie_secure: base_url.scheme() == "https",
            base_url,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            signin_page: DEFAULT_SIGNIN_PAGE.to_string(),
        })
    }

    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GOOGLE_CLIENT_ID`: Google OAuth client ID (required)
    /// - `GOOGLE_CLIENT_SECRET`: Google OAuth client secret (required)
    /// - `AUTH_SECRET`: Key used to sign session tokens (required)
    /// - `AUTH_BASE_URL`: Base URL for callback redirects (default: `http://localhost:3000`)
    /// - `SESSION_TTL_DAYS`: Session TTL in days (default: 30)
    /// - `COOKIE_SECURE`: Whether to set secure flag on cookies (default: true)
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a required variable is missing or a value is malformed.
    pub fn from_env() -> Result<Self, AuthError> {
        let base_url: Url = std::env::var("AUTH_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .parse()
            .map_err(|e| AuthError::Config(format!("AUTH_BASE_URL is not a valid URL: {e}")))?;

        let mut config = Self::new(
            base_url,
            required_var("GOOGLE_CLIENT_ID")?,
            required_var("GOOGLE_CLIENT_SECRET")?,
            required_var("AUTH_SECRET")?,
        )?;

        if let Ok(days) = std::env::var("SESSION_TTL_DAYS") {
            config.session_ttl = session_ttl_from_days(&days)?;
        }

        config.cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);

        Ok(config)
    }

    /// URL that starts a sign-in with `provider`.
    pub fn signin_url(&self, provider: OidcProvider) -> Result<Url, AuthError> {
        self.base_url
            .join(&format!("/api/auth/signin/{provider}"))
            .map_err(|e| AuthError::Config(e.to_string()))
    }

    /// URL the provider redirects back to after authentication.
    pub fn callback_url(&self, provider: OidcProvider) -> Result<Url, AuthError> {
        callback_url(&self.base_url, provider)
    }
}

fn callback_url(base_url: &Url, provider: OidcProvider) -> Result<Url, AuthError> {
    base_url
        .join(&format!("/api/auth/callback/{provider}"))
        .map_err(|e| AuthError::Config(e.to_string()))
}

/// Parse `SESSION_TTL_DAYS` into a TTL a session expiry can be computed from.
fn session_ttl_from_days(days: &str) -> Result<Duration, AuthError> {
    let invalid = || AuthError::Config(format!("SESSION_TTL_DAYS is out of range: {days}"));

    let days: u64 = days
        .trim()
        .parse()
        .map_err(|e| AuthError::Config(format!("SESSION_TTL_DAYS is not a number: {e}")))?;
    if days == 0 {
        return Err(invalid());
    }

    let seconds = days.checked_mul(24 * 60 * 60).ok_or_else(invalid)?;
    let delta = i64::try_from(seconds)
        .ok()
        .and_then(chrono::TimeDelta::try_seconds)
        .ok_or_else(invalid)?;
    chrono::Utc::now()
        .checked_add_signed(delta)
        .ok_or_else(invalid)?;

    Ok(Duration::from_secs(seconds))
}

fn required_var(name: &str) -> Result<String, AuthError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AuthError::Config(format!("{name} must be set"))),
    }
}
