//! OIDC provider implementations.
//!
//! This module contains implementations of `IdentityProvider` for:
//! - Google (OIDC discovery, PKCE code exchange)
//! - Mock (base64 JSON codes issued by the Mock IdP, for development and tests)

mod google;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use google::GoogleProvider;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockIdentity, MockProvider};
