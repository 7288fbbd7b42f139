use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gatehouse_core::storage::{repository_error_to_status_code, RepositoryError};
use thiserror::Error;

/// Auth errors for the gatehouse_auth crate.
///
/// This wraps the core `AuthError` and the repository error, and adds
/// variants for configuration and provider wiring.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Error from the core auth module (state, token parsing, etc.)
    #[error(transparent)]
    Core(#[from] gatehouse_core::auth::AuthError),

    /// Error from the user store.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Provider not configured
    #[error("provider not configured: {0}")]
    ProviderNotConfigured(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        use gatehouse_core::auth::AuthError as CoreError;

        let (status, message) = match &self {
            AuthError::Core(core_err) => match core_err {
                CoreError::InvalidState | CoreError::FlowExpired => {
                    (StatusCode::BAD_REQUEST, self.to_string())
                }
                CoreError::UnknownProvider(_) => (StatusCode::NOT_FOUND, self.to_string()),
                CoreError::SessionExpired
                | CoreError::InvalidToken(_)
                | CoreError::MissingClaim(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
                CoreError::CodeExchange(_) | CoreError::Storage(_) | CoreError::Provider(_) => {
                    tracing::error!(error = %self, "Auth error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            AuthError::Repository(repo_err) => {
                tracing::error!(error = %repo_err, "User store error during auth");
                let status = StatusCode::from_u16(repository_error_to_status_code(repo_err))
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, "User store error".to_string())
            }
            AuthError::Config(_) => {
                tracing::error!(error = %self, "Config error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                )
            }
            AuthError::ProviderNotConfigured(provider) => (
                StatusCode::NOT_FOUND,
                format!("Authentication provider '{}' is not configured", provider),
            ),
        };

        (status, message).into_response()
    }
}
