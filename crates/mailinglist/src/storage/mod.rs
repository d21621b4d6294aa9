//! Storage backend implementations.
//!
//! This module provides concrete implementations of the database traits
//! defined in `mailinglist_core::storage`, selected via feature flags.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB backend using `aws-sdk-dynamodb`
//! - `inmemory` (default): process-local backend for tests
//!
//! Unlike a single-repository setup, both backends can be compiled in at
//! once; callers pick one behind `dyn SubscriptionsDatabase`.

#[cfg(not(any(feature = "dynamodb", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'dynamodb' or 'inmemory' feature. \
    Example: cargo build -p mailinglist --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::{DynamoDbConfirmationsDatabase, DynamoDbSubscriptionsDatabase};

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryDatabase;
