//! Storage for in-flight sign-in flows.
//!
//! Provides `AuthFlowRepository` implementations for:
//! - SQLite (with `sqlite` feature)
//! - In-memory (always available; used by tests and `--in-memory` runs)

mod inmemory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use inmemory::InMemoryFlowStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteFlowStore;
