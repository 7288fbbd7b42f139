//! HTML pages: sign-in, home and dashboard.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use gatehouse_auth::{AuthState, CurrentSession, OptionalSession};
use gatehouse_core::auth::{validate_callback_url, SessionUser};
use gatehouse_core::html::html_escape;
use serde::Deserialize;

use super::AppError;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SigninQuery {
    pub callback_url: Option<String>,
    pub error: Option<String>,
}

/// Handler for GET /auth/signin
///
/// - Authenticated: redirects to `callbackUrl` (or `/`)
/// - Unauthenticated: renders one button per configured provider, plus the
///   `error` from a failed sign-in when there is one
pub async fn signin_page(
    State(state): State<AuthState>,
    OptionalSession(session): OptionalSession,
    Query(query): Query<SigninQuery>,
) -> Result<Response, AppError> {
    let callback_url = query
        .callback_url
        .as_deref()
        .and_then(validate_callback_url);

    if session.is_some() {
        return Ok(Redirect::to(callback_url.unwrap_or("/")).into_response());
    }

    let callback_param = callback_url
        .map(|url| format!("?callbackUrl={}", urlencoding::encode(url)))
        .unwrap_or_default();

    let mut buttons = String::new();
    for provider in state.configured_providers() {
        let signin_url = state.config.signin_url(provider)?;
        buttons.push_str(&format!(
            r#"<a href="{href}{callback_param}" class="signin-button">Sign in with {name}</a>"#,
            href = html_escape(signin_url.as_str()),
            callback_param = html_escape(&callback_param),
            name = provider.display_name(),
        ));
    }

    if buttons.is_empty() {
        buttons = r#"<p class="signin-no-providers">No sign-in providers configured.</p>"#
            .to_string();
    }

    let error = query
        .error
        .as_deref()
        .map(|code| {
            format!(
                r#"<p class="signin-error">{}</p>"#,
                html_escape(error_message(code))
            )
        })
        .unwrap_or_default();

    Ok(Html(page(
        "Sign in",
        &format!(
            r#"<h1>Sign in</h1>
        {error}
        <div class="signin-buttons">
            {buttons}
        </div>"#
        ),
    ))
    .into_response())
}

/// Handler for GET /
#[axum::debug_handler(state = AuthState)]
pub async fn home(CurrentSession(session): CurrentSession) -> Html<String> {
    Html(page(
        "Home",
        &format!(
            r#"<h1>Hello, {name}</h1>
        <p><a href="/dashboard">Dashboard</a></p>
        {signout}"#,
            name = html_escape(&greeting_name(&session.user)),
            signout = SIGNOUT_FORM,
        ),
    ))
}

/// Handler for GET /dashboard
///
/// Shows the enriched session fields.
#[axum::debug_handler(state = AuthState)]
pub async fn dashboard(CurrentSession(session): CurrentSession) -> Html<String> {
    let user = &session.user;
    let field = |value: Option<&str>| html_escape(value.unwrap_or("-"));

    Html(page(
        "Dashboard",
        &format!(
            r#"<h1>Dashboard</h1>
        <p>Welcome back, {name}.</p>
        <dl>
            <dt>User id</dt><dd>{id}</dd>
            <dt>First name</dt><dd>{first_name}</dd>
            <dt>Last name</dt><dd>{last_name}</dd>
            <dt>Email</dt><dd>{email}</dd>
            <dt>Session expires</dt><dd>{expires}</dd>
        </dl>
        {signout}"#,
            name = html_escape(&greeting_name(user)),
            id = field(user.id.as_deref()),
            first_name = field(user.first_name.as_deref()),
            last_name = field(user.last_name.as_deref()),
            email = field(user.email.as_deref()),
            expires = session.expires.to_rfc3339(),
            signout = SIGNOUT_FORM,
        ),
    ))
}

const SIGNOUT_FORM: &str = r#"<form method="post" action="/api/auth/signout">
            <button type="submit">Sign out</button>
        </form>"#;

/// Stored first name when the session was enriched, then the provider's
/// display name, then the email.
fn greeting_name(user: &SessionUser) -> String {
    user.first_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(user.name.as_deref())
        .or(user.email.as_deref())
        .unwrap_or("there")
        .to_string()
}

/// Human readable text for the `error` codes the callback redirects with.
fn error_message(code: &str) -> &'static str {
    match code {
        "AccessDenied" => "Sign-in was denied. Your account must share an email address.",
        "OAuthCallback" => "The provider sign-in could not be completed. Please try again.",
        "Callback" => "Something went wrong while signing you in. Please try again.",
        "Configuration" => "Sign-in is not configured correctly.",
        _ => "Unable to sign in.",
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Gatehouse</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 480px; margin: 4rem auto; }}
        .signin-buttons {{ display: flex; flex-direction: column; gap: 1rem; }}
        .signin-button {{ padding: 0.875rem 1.5rem; border: 1px solid #ddd; border-radius: 8px; text-align: center; text-decoration: none; color: #333; }}
        .signin-error {{ color: #b00020; }}
        .signin-no-providers {{ color: #666; font-style: italic; }}
    </style>
</head>
<body>
        {body}
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_prefers_stored_first_name() {
        let user = SessionUser {
            name: Some("Ada Lovelace".to_string()),
            first_name: Some("Ada".to_string()),
            ..Default::default()
        };
        assert_eq!(greeting_name(&user), "Ada");
    }

    #[test]
    fn greeting_falls_back_to_provider_name_then_email() {
        let user = SessionUser {
            name: Some("Ada Lovelace".to_string()),
            first_name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(greeting_name(&user), "Ada Lovelace");

        let user = SessionUser {
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(greeting_name(&user), "ada@example.com");
    }

    #[test]
    fn unknown_error_codes_get_generic_message() {
        assert_eq!(error_message("Whatever"), "Unable to sign in.");
        assert!(error_message("AccessDenied").contains("denied"));
    }
}
