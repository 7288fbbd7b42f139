//! Axum extractors for authentication.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use gatehouse_core::auth::{is_session_expired, Session};

use crate::error::AuthError;
use crate::AuthState;

/// Session token from the request: Bearer header first (API clients), then
/// the session cookie (browsers).
pub(crate) fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(cookie_name)
            .map(|c| c.value().to_string())
    })
}

/// Decode and enrich the request's session.
///
/// Missing, invalid or expired tokens give `Ok(None)`. Store failures while
/// enriching propagate.
pub(crate) async fn resolve_session(
    auth: &AuthState,
    headers: &HeaderMap,
) -> Result<Option<Session>, AuthError> {
    let Some(token) = session_token(headers, &auth.config.cookie_name) else {
        return Ok(None);
    };

    let session = match auth.codec.decode(&token) {
        Ok(session) => session,
        Err(err) => {
            tracing::debug!(error = %err, "Ignoring unusable session token");
            return Ok(None);
        }
    };

    if is_session_expired(&session, Utc::now()) {
        return Ok(None);
    }

    auth.enricher().enrich(session).await.map(Some)
}

/// Extractor for an authenticated session. Returns 401 if not authenticated.
///
/// Reuses the session the route-gate middleware already resolved when there
/// is one.
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(CurrentSession(session.clone()));
        }

        let auth_state = AuthState::from_ref(state);

        match resolve_session(&auth_state, &parts.headers).await {
            Ok(Some(session)) => Ok(CurrentSession(session)),
            Ok(None) => Err((StatusCode::UNAUTHORIZED, "Not authenticated")),
            Err(err) => {
                tracing::error!(error = %err, "Session lookup failed");
                Err((StatusCode::INTERNAL_SERVER_ERROR, "Session lookup failed"))
            }
        }
    }
}

/// Extractor for an optional session. Returns None if not authenticated.
pub struct OptionalSession(pub Option<Session>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentSession::from_request_parts(parts, state).await {
            Ok(CurrentSession(session)) => Ok(OptionalSession(Some(session))),
            Err((status, _)) if status == StatusCode::UNAUTHORIZED => Ok(OptionalSession(None)),
            Err(rejection) => Err(rejection),
        }
    }
}
