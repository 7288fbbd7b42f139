//! Route-gate middleware.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::extractors::resolve_session;
use crate::AuthState;

/// Require a valid session on every path the gate does not exempt.
///
/// Requests without one are redirected to the sign-in page with the
/// original path and query as `callbackUrl`. The enriched session of an
/// authenticated request is inserted into its extensions.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/dashboard", get(dashboard))
///     .layer(middleware::from_fn_with_state(auth_state.clone(), require_session))
///     .with_state(auth_state);
/// ```
pub async fn require_session(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    if auth.gate.is_exempt(request.uri().path()) {
        return next.run(request).await;
    }

    match resolve_session(&auth, request.headers()).await {
        Ok(Some(session)) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Ok(None) => {
            tracing::debug!(path = %request.uri().path(), "No session, redirecting to sign-in");
            signin_redirect(&auth.config.signin_page, request.uri()).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Redirect to `signin_page` remembering where the user was headed.
pub fn signin_redirect(signin_page: &str, original: &Uri) -> Redirect {
    let target = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    Redirect::to(&format!(
        "{signin_page}?callbackUrl={}",
        urlencoding::encode(target)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, StatusCode},
        middleware,
        routing::get,
        Extension, Router,
    };
    use gatehouse_core::auth::Session;
    use tower::ServiceExt;

    use crate::storage::InMemoryUserStore;
    use crate::test_support::{session_cookie, test_state};

    async fn whoami(Extension(session): Extension<Session>) -> String {
        session.user.id.unwrap_or_default()
    }

    fn app(auth: AuthState) -> Router {
        Router::new()
            .route("/dashboard", get(whoami))
            .route("/api/auth/callback/google", get(|| async { "callback" }))
            .layer(middleware::from_fn_with_state(auth.clone(), require_session))
            .with_state(auth)
    }

    #[tokio::test]
    async fn protected_path_without_session_redirects_to_signin() {
        let app = app(test_state(&InMemoryUserStore::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/dashboard?tab=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/signin?callbackUrl=%2Fdashboard%3Ftab%3D1"
        );
    }

    #[tokio::test]
    async fn exempt_path_passes_without_session() {
        let app = app(test_state(&InMemoryUserStore::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/callback/google")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_token_redirects_to_signin() {
        let app = app(test_state(&InMemoryUserStore::new()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .header(header::COOKIE, "gatehouse.session-token=forged")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/signin?callbackUrl=%2Fdashboard"
        );
    }

    #[tokio::test]
    async fn valid_session_reaches_handler_enriched() {
        let users = InMemoryUserStore::new();
        let auth = test_state(&users);
        auth.reconciler()
            .reconcile(
                &crate::test_support::identity("ada@example.com"),
                Default::default(),
            )
            .await
            .unwrap();
        let cookie = session_cookie(&auth, "ada@example.com");

        let response = app(auth)
            .oneshot(
                Request::builder()
                    .uri("/dashboard")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = http_body_util::BodyExt::collect(response.into_body())
            .await
            .unwrap()
            .to_bytes();
        assert_eq!(&body[..], b"1");
    }
}
