//! Route gate: which request paths may skip the session check.

/// Path prefixes that never require a session.
///
/// - `api/auth`: sign-in, callback, session and sign-out endpoints
/// - `auth`: sign-in and error pages
/// - `_next/static`, `_next/image`: static bundles and optimized images
/// - `favicon.ico`
/// - `public`: public assets
pub const DEFAULT_EXEMPTIONS: [&str; 6] = [
    "api/auth",
    "auth",
    "_next/static",
    "_next/image",
    "favicon.ico",
    "public",
];

/// Decides whether a request path must carry a valid session.
///
/// Exemptions are plain prefixes of the path after its leading `/`, so the
/// `auth` exemption also covers `/authors`. The root path `/` is never exempt
/// unless an empty prefix is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGate {
    exemptions: Vec<String>,
}

impl Default for RouteGate {
    fn default() -> Self {
        Self::new(DEFAULT_EXEMPTIONS)
    }
}

impl RouteGate {
    /// Create a gate with the given exemption prefixes.
    pub fn new<I, S>(exemptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exemptions: exemptions
                .into_iter()
                .map(|e| e.into().trim_start_matches('/').to_string())
                .collect(),
        }
    }

    /// Add an exemption prefix.
    pub fn with_exemption(mut self, prefix: impl Into<String>) -> Self {
        self.exemptions
            .push(prefix.into().trim_start_matches('/').to_string());
        self
    }

    /// Exemption prefixes, without leading slashes.
    pub fn exemptions(&self) -> &[String] {
        &self.exemptions
    }

    /// Returns true when `path` may be served without a session.
    pub fn is_exempt(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        self.exemptions
            .iter()
            .any(|prefix| rest.starts_with(prefix.as_str()))
    }

    /// Returns true when `path` must carry a valid session.
    pub fn requires_session(&self, path: &str) -> bool {
        !self.is_exempt(path)
    }
}
