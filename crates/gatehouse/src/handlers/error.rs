use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Page handler error that wraps `anyhow::Error`.
///
/// Lets page handlers use `?` on store and auth calls; the details are
/// logged and the browser gets a generic 500.
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Application error");

        (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
