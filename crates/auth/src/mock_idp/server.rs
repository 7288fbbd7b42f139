//! Mock IdP server for development and testing.
//!
//! Simulates the Google authorization endpoint: it renders a login form and
//! sends the browser back to the app with a code that encodes the identity
//! entered in the form (see `MockProvider`).

use std::net::SocketAddr;

use axum::{
    extract::Query,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use gatehouse_core::auth::OidcProvider;
use serde::Deserialize;
use tokio::net::TcpListener;

use super::templates;
use crate::providers::MockIdentity;

#[derive(Deserialize)]
struct AuthorizeQuery {
    state: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct LoginForm {
    /// Left empty to simulate a provider that withholds the email.
    #[serde(default, deserialize_with = "gatehouse_core::serde::deserialize_blank_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "gatehouse_core::serde::deserialize_blank_as_none")]
    name: Option<String>,
    state: String,
    redirect_uri: String,
    /// `query` (default) or `form_post`.
    #[serde(default)]
    response_mode: Option<String>,
}

/// Mock IdP server that simulates OIDC authorization endpoints.
pub struct MockIdpServer {
    port: u16,
}

impl MockIdpServer {
    /// Create a new Mock IdP server.
    ///
    /// # Arguments
    /// * `port` - The port to listen on (typically 3001)
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Run the Mock IdP server until the listener fails.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        tracing::info!("Mock IdP server listening on http://{}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router()).await
    }
}

/// Routes of the Mock IdP:
/// - `GET /google/authorize` - Google login page
/// - `POST /authorize/submit` - Form submission handler
pub fn router() -> Router {
    Router::new()
        .route("/google/authorize", get(google_authorize))
        .route("/authorize/submit", post(authorize_submit))
}

async fn google_authorize(Query(params): Query<AuthorizeQuery>) -> Html<String> {
    Html(templates::login_page(
        OidcProvider::Google,
        &params.state,
        &params.redirect_uri,
    ))
}

async fn authorize_submit(Form(form): Form<LoginForm>) -> Response {
    let subject = form.email.as_deref().unwrap_or("anonymous");
    let code = MockIdentity {
        sub: format!("mock-google-{subject}"),
        access_token: Some(format!("mock-access-{subject}")),
        email: form.email,
        name: form.name,
        picture: None,
    }
    .to_code();

    if form.response_mode.as_deref() == Some("form_post") {
        return Html(templates::form_post_page(&form.redirect_uri, &code, &form.state))
            .into_response();
    }

    let callback_url = format!(
        "{}?code={}&state={}",
        form.redirect_uri,
        urlencoding::encode(&code),
        urlencoding::encode(&form.state),
    );
    Redirect::to(&callback_url).into_response()
}
