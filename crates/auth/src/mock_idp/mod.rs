//! Mock Identity Provider for development and testing.
//!
//! Provides a fake OIDC authorization server so the full sign-in flow can
//! run without real Google credentials.

mod server;
mod templates;

pub use server::{router, MockIdpServer};
