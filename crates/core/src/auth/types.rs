use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::identity::TokenSet;

/// Supported OIDC providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OidcProvider {
    Google,
}

impl OidcProvider {
    /// Every provider variant, in display order.
    pub const ALL: [OidcProvider; 1] = [OidcProvider::Google];

    /// Human readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
        }
    }

    /// Account type recorded on account links created through this provider.
    pub fn account_type(&self) -> &'static str {
        match self {
            Self::Google => "oidc",
        }
    }
}

impl std::fmt::Display for OidcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
        }
    }
}

impl FromStr for OidcProvider {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            other => Err(AuthError::UnknownProvider(other.to_string())),
        }
    }
}

/// What the sign-in path does with a provider's identity assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInPolicy {
    /// Require an email, ensure a local user and refresh the account link.
    #[default]
    Reconcile,
    /// Allow the sign-in without touching local records.
    PassThrough,
}

/// Identity assertion reported by a provider after a code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub provider: OidcProvider,
    /// Provider's unique user identifier (the OIDC `sub` claim).
    pub provider_account_id: String,
    pub email: Option<String>,
    /// Display name, split into first and last name on first sign-in.
    pub name: Option<String>,
    pub image: Option<String>,
    pub tokens: TokenSet,
}

/// User section of a session payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Session payload handed to clients.
///
/// Rebuilt from the signed session token on every request and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
}

/// PKCE and state data stored while the user is at the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthFlowState {
    pub pkce_verifier: String,
    pub provider: OidcProvider,
    pub created_at: DateTime<Utc>,
    /// Relative URL to land on after a successful sign-in.
    pub callback_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_round_trips_through_its_path_segment() {
        for provider in OidcProvider::ALL {
            assert_eq!(provider.to_string().parse::<OidcProvider>().unwrap(), provider);
        }
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = "github".parse::<OidcProvider>().unwrap_err();
        assert!(matches!(err, AuthError::UnknownProvider(ref p) if p == "github"));
    }

    #[test]
    fn session_serializes_camel_case_and_skips_missing_fields() {
        let session = Session {
            user: SessionUser {
                id: Some("7".to_string()),
                first_name: Some("Ada".to_string()),
                last_name: Some(String::new()),
                email: Some("ada@example.com".to_string()),
                ..Default::default()
            },
            expires: DateTime::parse_from_rfc3339("2030-01-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&session).unwrap();

        assert_eq!(json["user"]["id"], "7");
        assert_eq!(json["user"]["firstName"], "Ada");
        assert_eq!(json["user"]["lastName"], "");
        assert!(json["user"].get("image").is_none());
        assert!(json["user"].get("name").is_none());
    }

    #[test]
    fn default_policy_reconciles() {
        assert_eq!(SignInPolicy::default(), SignInPolicy::Reconcile);
    }
}
