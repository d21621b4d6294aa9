//! In-memory storage backend.
//!
//! Useful for tests and for running without AWS access.

mod repository;

pub use repository::InMemoryDatabase;
