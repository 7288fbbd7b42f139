//! Sign-in, session enrichment and route gating for gatehouse.
//!
//! This crate provides:
//! - The OIDC flow with Google (plus a mock provider and IdP for development)
//! - The sign-in reconciler that upserts users and account links
//! - Stateless JWT sessions, enriched from the user store on every read
//! - User and auth-flow stores (in-memory, or SQLite with the `sqlite` feature)
//! - Axum routes, extractors and the route-gate middleware

mod config;
mod enrich;
mod error;
mod extractors;
mod flows;
mod gate;
mod handlers;
mod providers;
mod reconcile;
mod state;
pub mod storage;
mod token;

#[cfg(test)]
mod test_support;

pub use config::{AuthConfig, ProviderConfig, DEFAULT_COOKIE_NAME, DEFAULT_SIGNIN_PAGE};
pub use enrich::SessionEnricher;
pub use error::AuthError;
pub use extractors::{CurrentSession, OptionalSession};
pub use flows::InMemoryFlowStore;
#[cfg(feature = "sqlite")]
pub use flows::SqliteFlowStore;
pub use gate::{require_session, signin_redirect};
pub use handlers::auth_routes;
pub use providers::GoogleProvider;
#[cfg(any(test, feature = "mock"))]
pub use providers::{MockIdentity, MockProvider};
pub use reconcile::{DenyReason, SignInOutcome, SignInReconciler};
pub use state::AuthState;
pub use token::{SessionClaims, SessionCodec};

#[cfg(any(test, feature = "mock"))]
pub mod mock_idp;
