/// Validates a post-sign-in `callbackUrl` to prevent open redirects.
///
/// Returns `Some(url)` if the URL is a relative path on this site, `None`
/// otherwise. Accepted URLs:
/// - start with a single `/` (not `//host`)
/// - contain no control characters
/// - contain no `://` anywhere, including the query string
///
/// # Examples
///
/// ```
/// use gatehouse_core::auth::validate_callback_url;
///
/// assert_eq!(validate_callback_url("/dashboard"), Some("/dashboard"));
/// assert_eq!(validate_callback_url("//evil.com"), None);
/// assert_eq!(validate_callback_url("https://evil.com"), None);
/// ```
pub fn validate_callback_url(url: &str) -> Option<&str> {
    if !url.starts_with('/') || url.starts_with("//") {
        return None;
    }

    // Backslashes are normalized to slashes by some browsers (`/\evil.com`).
    if url.starts_with("/\\") {
        return None;
    }

    if url.chars().any(|c| c.is_control()) {
        return None;
    }

    if url.contains("://") {
        return None;
    }

    Some(url)
}
