//! Error types for table setup.

use std::error::Error as StdError;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for table setup.
pub type Result<T> = std::result::Result<T, SetupError>;

/// Errors that can occur while ensuring a table exists.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Table '{table_name}' is being deleted")]
    TableDeleting { table_name: String },

    #[error("Table '{table_name}' is not usable (status: {status})")]
    TableUnusable { table_name: String, status: String },

    #[error("Timeout waiting for table '{table_name}' to become active")]
    TableActivationTimeout { table_name: String },
}

impl SetupError {
    /// Wraps any SDK error, keeping the full source chain in the message.
    pub fn from_sdk<E: StdError>(err: E) -> Self {
        SetupError::AwsSdk(DisplayErrorContext(&err).to_string())
    }
}
