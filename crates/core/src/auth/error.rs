use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid OIDC state parameter")]
    InvalidState,

    #[error("auth flow expired before the provider called back")]
    FlowExpired,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("failed to exchange authorization code: {0}")]
    CodeExchange(String),

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("missing required claim: {0}")]
    MissingClaim(String),

    #[error("session expired")]
    SessionExpired,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("provider error: {0}")]
    Provider(String),
}
