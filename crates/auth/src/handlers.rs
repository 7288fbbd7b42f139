//! HTTP handlers for auth routes.

use std::collections::BTreeMap;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use gatehouse_core::auth::{
    generate_state, is_flow_expired, validate_callback_url, AuthError as CoreError,
    AuthFlowState, OidcProvider, AUTH_FLOW_MAX_AGE,
};
use openidconnect::PkceCodeChallenge;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::extractors::resolve_session;
use crate::reconcile::SignInOutcome;
use crate::AuthState;

/// Parameters the provider sends back, as query string or form post.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by the provider when the user cancelled or the request failed.
    pub error: Option<String>,
}

/// Query parameters for the sign-in endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInQuery {
    /// Relative URL to land on after a successful sign-in.
    pub callback_url: Option<String>,
}

/// One entry of the `/api/auth/providers` listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: String,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub signin_url: String,
    pub callback_url: String,
}

/// Creates the auth router with all authentication routes.
///
/// Routes:
/// - `GET /api/auth/providers` - List configured providers
/// - `GET /api/auth/signin/{provider}` - Initiate the OIDC flow
/// - `GET|POST /api/auth/callback/{provider}` - Handle the provider callback
/// - `GET /api/auth/session` - Current enriched session, or `{}`
/// - `POST /api/auth/signout` - Clear the session cookie
pub fn auth_routes<S>() -> Router<S>
where
    AuthState: FromRef<S>,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/auth/providers", get(providers))
        .route("/api/auth/signin/{provider}", get(signin))
        .route(
            "/api/auth/callback/{provider}",
            get(callback_query).post(callback_form),
        )
        .route("/api/auth/session", get(session))
        .route("/api/auth/signout", post(signout))
}

async fn providers(
    State(state): State<AuthState>,
) -> Result<Json<BTreeMap<String, ProviderInfo>>, AuthError> {
    let mut listing = BTreeMap::new();

    for provider in state.configured_providers() {
        listing.insert(
            provider.to_string(),
            ProviderInfo {
                id: provider.to_string(),
                name: provider.display_name(),
                kind: provider.account_type(),
                signin_url: state.config.signin_url(provider)?.to_string(),
                callback_url: state.config.callback_url(provider)?.to_string(),
            },
        );
    }

    Ok(Json(listing))
}

async fn signin(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(query): Query<SignInQuery>,
) -> Result<Redirect, AuthError> {
    let provider: OidcProvider = provider.parse()?;
    let provider_client = state.get_provider(provider)?;

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let csrf_state = generate_state();

    // Only relative callback URLs survive, to prevent open redirects
    let callback_url = query
        .callback_url
        .as_deref()
        .and_then(validate_callback_url)
        .map(String::from);

    let flow = AuthFlowState {
        pkce_verifier: pkce_verifier.secret().to_string(),
        provider,
        created_at: Utc::now(),
        callback_url,
    };
    state.flows.store_auth_flow(&csrf_state, &flow).await?;

    let auth_url = provider_client
        .authorization_url(&csrf_state, pkce_challenge.as_str())
        .await?;

    tracing::debug!(provider = %provider, "Redirecting to provider");

    Ok(Redirect::to(auth_url.as_str()))
}

async fn callback_query(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<Response, AuthError> {
    let provider: OidcProvider = provider.parse()?;
    Ok(handle_callback(&state, provider, params, jar).await)
}

/// Providers using `response_mode=form_post` send the callback as a form.
async fn callback_form(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    jar: CookieJar,
    Form(params): Form<CallbackParams>,
) -> Result<Response, AuthError> {
    let provider: OidcProvider = provider.parse()?;
    Ok(handle_callback(&state, provider, params, jar).await)
}

/// Finish a sign-in. Every failure ends on the sign-in page with an error code.
async fn handle_callback(
    state: &AuthState,
    provider: OidcProvider,
    params: CallbackParams,
    jar: CookieJar,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(provider = %provider, error = %error, "Provider returned an error");
        return error_redirect(state, "OAuthCallback").into_response();
    }

    let (Some(code), Some(csrf_state)) = (params.code, params.state) else {
        tracing::warn!(provider = %provider, "Callback without code or state");
        return error_redirect(state, "OAuthCallback").into_response();
    };

    match complete_sign_in(state, provider, &code, &csrf_state).await {
        Ok(CallbackResult::SignedIn { token, redirect_to }) => {
            let cookie = Cookie::build((state.config.cookie_name.clone(), token))
                .path("/")
                .http_only(true)
                .secure(state.config.cookie_secure)
                .same_site(SameSite::Lax)
                .max_age(time::Duration::seconds(state.codec.ttl_seconds()))
                .build();

            (jar.add(cookie), Redirect::to(&redirect_to)).into_response()
        }
        Ok(CallbackResult::Denied(code)) => error_redirect(state, code).into_response(),
        Err(err) => {
            tracing::error!(provider = %provider, error = %err, "Sign-in callback failed");
            error_redirect(state, callback_error_code(&err)).into_response()
        }
    }
}

enum CallbackResult {
    SignedIn { token: String, redirect_to: String },
    Denied(&'static str),
}

async fn complete_sign_in(
    state: &AuthState,
    provider: OidcProvider,
    code: &str,
    csrf_state: &str,
) -> Result<CallbackResult, AuthError> {
    // Taking the flow consumes the state, so a callback cannot be replayed
    let flow = state
        .flows
        .take_auth_flow(csrf_state)
        .await?
        .filter(|flow| flow.provider == provider)
        .ok_or(CoreError::InvalidState)?;

    if is_flow_expired(&flow, Utc::now(), AUTH_FLOW_MAX_AGE) {
        return Err(CoreError::FlowExpired.into());
    }

    let provider_client = state.get_provider(provider)?;
    let identity = provider_client
        .exchange_code(code, &flow.pkce_verifier)
        .await?;

    match state
        .reconciler()
        .reconcile(&identity, provider_client.sign_in_policy())
        .await?
    {
        SignInOutcome::Allowed { .. } => Ok(CallbackResult::SignedIn {
            token: state.codec.issue(&identity)?,
            redirect_to: flow.callback_url.unwrap_or_else(|| "/".to_string()),
        }),
        SignInOutcome::Denied(reason) => Ok(CallbackResult::Denied(reason.error_code())),
    }
}

/// Sign-in page error code for a failed callback.
///
/// Protocol failures (bad state, code exchange, token checks) are reported
/// as `OAuthCallback`; store and configuration failures as `Callback`.
fn callback_error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::Core(
            CoreError::InvalidState
            | CoreError::FlowExpired
            | CoreError::CodeExchange(_)
            | CoreError::InvalidToken(_)
            | CoreError::MissingClaim(_)
            | CoreError::Provider(_),
        ) => "OAuthCallback",
        _ => "Callback",
    }
}

fn error_redirect(state: &AuthState, code: &str) -> Redirect {
    Redirect::to(&format!("{}?error={}", state.config.signin_page, code))
}

async fn session(State(state): State<AuthState>, headers: HeaderMap) -> Result<Response, AuthError> {
    match resolve_session(&state, &headers).await? {
        Some(session) => Ok(Json(session).into_response()),
        None => Ok(Json(serde_json::json!({})).into_response()),
    }
}

async fn signout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(state.config.cookie_name.clone()).path("/"));
    (jar, Redirect::to(&state.config.signin_page))
}
