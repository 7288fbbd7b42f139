//! Signed session tokens (HS256 JWT).
//!
//! Sessions are stateless: the token carries the provider's identity claims
//! and the session is rebuilt from it on every request.

use chrono::{DateTime, Duration, Utc};
use gatehouse_core::auth::{
    calculate_expiry, AuthError as CoreError, OidcProvider, ProviderIdentity, Session,
    SessionUser,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Claims stored in the session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Provider account id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub provider: OidcProvider,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    /// Claims for a fresh session of `identity`.
    ///
    /// # Errors
    ///
    /// `Config` when `issued_at + ttl` is out of range.
    pub fn for_identity(
        identity: &ProviderIdentity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, AuthError> {
        let expires = calculate_expiry(issued_at, ttl)
            .ok_or_else(|| AuthError::Config(format!("session TTL out of range: {ttl}")))?;

        Ok(Self {
            sub: identity.provider_account_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            picture: identity.image.clone(),
            provider: identity.provider,
            iat: issued_at.timestamp(),
            exp: expires.timestamp(),
        })
    }

    /// The un-enriched session payload these claims describe.
    pub fn into_session(self) -> Result<Session, AuthError> {
        let expires = DateTime::from_timestamp(self.exp, 0)
            .ok_or_else(|| CoreError::InvalidToken(format!("exp out of range: {}", self.exp)))?;

        Ok(Session {
            user: SessionUser {
                name: self.name,
                email: self.email,
                image: self.picture,
                ..Default::default()
            },
            expires,
        })
    }
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionCodec {
    /// A TTL beyond what chrono can represent saturates; issuing then fails
    /// with `Config` rather than overflowing.
    pub fn new(secret: &str, ttl: std::time::Duration) -> Self {
        let ttl = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issue a token for `identity`, valid for the configured TTL from now.
    pub fn issue(&self, identity: &ProviderIdentity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        identity: &ProviderIdentity,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = SessionClaims::for_identity(identity, now, self.ttl)?;

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Config(format!("failed to sign session token: {e}")))
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// `SessionExpired` once `exp` has passed, `InvalidToken` for anything
    /// that fails to verify.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CoreError::SessionExpired.into(),
                _ => CoreError::InvalidToken(e.to_string()).into(),
            })
    }

    /// Verify `token` and rebuild the session it carries.
    pub fn decode(&self, token: &str) -> Result<Session, AuthError> {
        self.verify(token)?.into_session()
    }

    /// Cookie max-age, in seconds.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
