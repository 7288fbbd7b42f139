//! HTML templates for the Mock IdP login pages.

use gatehouse_core::auth::OidcProvider;
use gatehouse_core::html::html_escape;

/// Generate an auto-submitting form POST page.
///
/// With `response_mode=form_post` the authorization code and state reach
/// the callback as a form POST rather than URL query parameters.
pub fn form_post_page(redirect_uri: &str, code: &str, state: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Redirecting...</title>
</head>
<body onload="document.forms[0].submit()">
    <form method="POST" action="{redirect_uri}">
        <input type="hidden" name="code" value="{code}" />
        <input type="hidden" name="state" value="{state}" />
        <noscript>
            <p>JavaScript is disabled. Click the button below to continue.</p>
            <button type="submit">Continue</button>
        </noscript>
    </form>
</body>
</html>"#,
        redirect_uri = html_escape(redirect_uri),
        code = html_escape(code),
        state = html_escape(state),
    )
}

/// Generate the HTML login page for a given OIDC provider.
pub fn login_page(provider: OidcProvider, state: &str, redirect_uri: &str) -> String {
    let provider_name = provider.display_name();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mock {provider_name} Sign In (DEV ONLY)</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, sans-serif;
            max-width: 400px;
            margin: 100px auto;
            padding: 20px;
        }}
        .warning {{
            background: #fff3cd;
            border: 1px solid #ffc107;
            padding: 15px;
            border-radius: 8px;
            margin-bottom: 20px;
        }}
        form {{
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
        }}
        label {{
            display: block;
            margin-bottom: 5px;
            font-weight: 500;
        }}
        input, select {{
            width: 100%;
            padding: 10px;
            margin-bottom: 15px;
            border: 1px solid #ced4da;
            border-radius: 4px;
            box-sizing: border-box;
        }}
        button {{
            width: 100%;
            padding: 12px;
            background: #007bff;
            color: white;
            border: none;
            border-radius: 4px;
            font-size: 16px;
        }}
    </style>
</head>
<body>
    <div class="warning">
        <h2>Development Only</h2>
        <p>This is a <strong>mock {provider_name} login</strong> for development purposes.</p>
        <p>Leave the email empty to simulate an identity without one.</p>
    </div>

    <form action="/authorize/submit" method="POST">
        <input type="hidden" name="state" value="{state}" />
        <input type="hidden" name="redirect_uri" value="{redirect_uri}" />

        <label for="email">Email Address</label>
        <input type="email" id="email" name="email" placeholder="dev@example.com" />

        <label for="name">Name (optional)</label>
        <input type="text" id="name" name="name" placeholder="Dev User" />

        <label for="response_mode">Response mode</label>
        <select id="response_mode" name="response_mode">
            <option value="query">query</option>
            <option value="form_post">form_post</option>
        </select>

        <button type="submit">Sign in with {provider_name}</button>
    </form>
</body>
</html>"#,
        state = html_escape(state),
        redirect_uri = html_escape(redirect_uri),
    )
}
