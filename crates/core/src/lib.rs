//! Functional core for gatehouse.
//!
//! Pure data types and rules shared by the auth shell and the server:
//! - `identity`: users, provider-account links and how they are derived
//! - `auth`: providers, sessions, route gate and flow helpers
//! - `storage`: repository traits and errors
//! - `html`: escaping for server-rendered pages

pub mod auth;
pub mod html;
pub mod identity;
pub mod serde;
pub mod storage;
