//! SQLite user store backed by `sqlx`.
//!
//! A unit of work wraps a pool transaction; dropping it without commit
//! rolls the transaction back.

mod conversions;
mod error;
mod repository;
mod schema;

pub use repository::SqliteUserStore;
