//! Storage backends for mailing list subscriptions.
//!
//! The traits live in `mailinglist_core::storage`; this crate provides the
//! DynamoDB implementation, an in-memory one for tests, and the
//! configuration both are built from.

pub mod config;
pub mod storage;

pub use config::{AwsConfig, BillingMode, ConfigError, Credentials, DatabaseOptions};
