//! Liveness endpoint.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    version: &'static str,
}

/// GET /health - Basic liveness probe.
///
/// Exempt from the route gate, so it answers without a session.
#[axum::debug_handler]
pub async fn health() -> (StatusCode, Json<Health>) {
    (
        StatusCode::OK,
        Json(Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
