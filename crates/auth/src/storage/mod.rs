//! User store implementations.
//!
//! This module provides concrete implementations of `UserRepository` and
//! `UnitOfWork` from `gatehouse_core::storage`:
//!
//! - `inmemory`: HashMaps behind an `Arc<RwLock<_>>`, always available
//! - `sqlite` (with `sqlite` feature): `users` and `accounts` tables through `sqlx`

pub mod inmemory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use inmemory::InMemoryUserStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteUserStore;
