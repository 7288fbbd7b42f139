use std::time::Duration;

use axum::{http::StatusCode, middleware, routing::get, Router};
use gatehouse_auth::{auth_routes, require_session, AuthState};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{
    health::health,
    pages::{dashboard, home, signin_page},
};

/// Create the application router with all routes and middleware.
///
/// Every route sits behind the route gate; exempt prefixes (the auth API,
/// the sign-in page, `health`) are served without a session.
pub fn create_app(state: AuthState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/dashboard", get(dashboard))
        .route("/auth/signin", get(signin_page))
        .route("/health", get(health))
        .merge(auth_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, Response},
    };
    use gatehouse_auth::{
        storage::InMemoryUserStore, AuthConfig, InMemoryFlowStore, MockIdentity, MockProvider,
    };
    use gatehouse_core::auth::{OidcProvider, ProviderIdentity, RouteGate};
    use gatehouse_core::identity::TokenSet;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use url::Url;

    fn test_state(users: &InMemoryUserStore) -> AuthState {
        let config = AuthConfig::new(
            "http://localhost:3000".parse().unwrap(),
            "client-id",
            "client-secret",
            "test-secret",
        )
        .unwrap();
        let google = MockProvider::new(
            OidcProvider::Google,
            Url::parse("http://localhost:3001").unwrap(),
            config.google.redirect_uri.clone(),
        );

        AuthState::without_providers(
            Arc::new(users.clone()),
            Arc::new(InMemoryFlowStore::new()),
            config,
        )
        .with_google(Arc::new(google))
        .with_gate(RouteGate::default().with_exemption("health"))
    }

    fn session_cookie(state: &AuthState, email: &str) -> String {
        let identity = ProviderIdentity {
            provider: OidcProvider::Google,
            provider_account_id: format!("mock-google-{email}"),
            email: Some(email.to_string()),
            name: Some("Ada Lovelace".to_string()),
            image: None,
            tokens: TokenSet::default(),
        };
        let token = state.codec.issue(&identity).unwrap();
        format!("{}={}", state.config.cookie_name, token)
    }

    async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        app.clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn location(response: &Response<Body>) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_dashboard_without_session_redirects_to_signin() {
        let app = create_app(test_state(&InMemoryUserStore::new()));

        let response = get(&app, "/dashboard", None).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/signin?callbackUrl=%2Fdashboard");
    }

    #[tokio::test]
    async fn test_root_without_session_redirects_to_signin() {
        let app = create_app(test_state(&InMemoryUserStore::new()));

        let response = get(&app, "/", None).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/signin?callbackUrl=%2F");
    }

    #[tokio::test]
    async fn test_health_is_exempt() {
        let app = create_app(test_state(&InMemoryUserStore::new()));

        let response = get(&app, "/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value =
            serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_signin_page_lists_providers_and_error() {
        let app = create_app(test_state(&InMemoryUserStore::new()));

        let response = get(
            &app,
            "/auth/signin?error=AccessDenied&callbackUrl=%2Fdashboard",
            None,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Sign in with Google"));
        assert!(html.contains(
            "http://localhost:3000/api/auth/signin/google?callbackUrl=%2Fdashboard"
        ));
        assert!(html.contains("Sign-in was denied"));
    }

    #[tokio::test]
    async fn test_signin_page_redirects_signed_in_users() {
        let state = test_state(&InMemoryUserStore::new());
        let cookie = session_cookie(&state, "ada@example.com");
        let app = create_app(state);

        let response = get(&app, "/auth/signin?callbackUrl=%2Fdashboard", Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }

    #[tokio::test]
    async fn test_callback_route_is_not_gated() {
        let app = create_app(test_state(&InMemoryUserStore::new()));

        let response = get(&app, "/api/auth/callback/google?code=x&state=unknown", None).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/signin?error=OAuthCallback");
    }

    #[tokio::test]
    async fn test_sign_in_then_dashboard_shows_enriched_user() {
        let users = InMemoryUserStore::new();
        let app = create_app(test_state(&users));

        let response = get(&app, "/api/auth/signin/google?callbackUrl=%2Fdashboard", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let authorize = Url::parse(&location(&response)).unwrap();
        let csrf_state = authorize
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap();

        let code = MockIdentity {
            sub: "mock-google-ada".to_string(),
            email: Some("ada@example.com".to_string()),
            name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        }
        .to_code();
        let callback = format!(
            "/api/auth/callback/google?code={}&state={}",
            urlencoding::encode(&code),
            urlencoding::encode(&csrf_state)
        );
        let response = get(&app, &callback, None).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let cookie = set_cookie.split(';').next().unwrap();

        let response = get(&app, "/dashboard", Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Welcome back, Ada."));
        assert!(html.contains("<dd>Lovelace</dd>"));
        assert_eq!(users.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_session_for_unknown_user_still_reaches_home() {
        let state = test_state(&InMemoryUserStore::new());
        let cookie = session_cookie(&state, "grace@example.com");
        let app = create_app(state);

        let response = get(&app, "/", Some(&cookie)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Hello, Ada Lovelace"));
    }
}
