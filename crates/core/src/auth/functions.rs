use chrono::{DateTime, Duration, Utc};
use rand::{distr::Alphanumeric, Rng};

use super::{AuthFlowState, Session};

/// How long a pending auth flow stays valid while the user is at the provider.
pub const AUTH_FLOW_MAX_AGE: Duration = Duration::minutes(10);

/// Generate a random state parameter for CSRF protection.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Check if a session has expired.
pub fn is_session_expired(session: &Session, now: DateTime<Utc>) -> bool {
    session.expires <= now
}

/// Check if a pending auth flow is too old to be completed.
pub fn is_flow_expired(flow: &AuthFlowState, now: DateTime<Utc>, max_age: Duration) -> bool {
    flow.created_at
        .checked_add_signed(max_age)
        .is_none_or(|deadline| deadline <= now)
}

/// Calculate session expiry from issue time and TTL.
///
/// Returns `None` when the expiry is past the representable date range.
pub fn calculate_expiry(issued_at: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    issued_at.checked_add_signed(ttl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{OidcProvider, SessionUser};

    fn session_expiring_at(expires: DateTime<Utc>) -> Session {
        Session {
            user: SessionUser::default(),
            expires,
        }
    }

    fn flow_created_at(created_at: DateTime<Utc>) -> AuthFlowState {
        AuthFlowState {
            pkce_verifier: "verifier".to_string(),
            provider: OidcProvider::Google,
            created_at,
            callback_url: None,
        }
    }

    #[test]
    fn generate_state_produces_32_alphanumeric_chars() {
        let state = generate_state();
        assert_eq!(state.len(), 32);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, generate_state());
    }

    #[test]
    fn session_in_the_future_is_live() {
        let now = Utc::now();
        assert!(!is_session_expired(&session_expiring_at(now + Duration::hours(1)), now));
    }

    #[test]
    fn session_is_expired_at_and_after_its_expiry() {
        let now = Utc::now();
        assert!(is_session_expired(&session_expiring_at(now), now));
        assert!(is_session_expired(&session_expiring_at(now - Duration::seconds(1)), now));
    }

    #[test]
    fn fresh_flow_is_not_expired() {
        let now = Utc::now();
        let flow = flow_created_at(now - Duration::minutes(2));
        assert!(!is_flow_expired(&flow, now, AUTH_FLOW_MAX_AGE));
    }

    #[test]
    fn stale_flow_is_expired() {
        let now = Utc::now();
        let flow = flow_created_at(now - Duration::minutes(11));
        assert!(is_flow_expired(&flow, now, AUTH_FLOW_MAX_AGE));
    }

    #[test]
    fn calculate_expiry_adds_ttl() {
        let issued = Utc::now();
        assert_eq!(
            calculate_expiry(issued, Duration::days(30)),
            Some(issued + Duration::days(30))
        );
    }

    #[test]
    fn expiry_out_of_range_is_none() {
        assert_eq!(calculate_expiry(Utc::now(), Duration::MAX), None);
        assert_eq!(calculate_expiry(DateTime::<Utc>::MAX_UTC, Duration::seconds(1)), None);
    }
}
