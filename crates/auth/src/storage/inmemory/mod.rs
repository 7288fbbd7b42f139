//! In-memory user store for tests and `--in-memory` runs.
//!
//! A unit of work holds the write half of the store's lock and stages its
//! writes on a copy of the tables; commit swaps the copy in.

mod repository;

pub use repository::InMemoryUserStore;
