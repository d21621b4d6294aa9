//! DynamoDB storage backend implementation.
//!
//! Each database owns one table with a single string partition key:
//! `address` for subscriptions, `code` for confirmations.

mod client;
mod confirmations;
mod conversions;
mod error;
pub mod setup;
mod subscriptions;

pub use client::{create_client, get_table_state};
pub use confirmations::DynamoDbConfirmationsDatabase;
pub use subscriptions::DynamoDbSubscriptionsDatabase;
