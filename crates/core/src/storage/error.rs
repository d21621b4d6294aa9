use thiserror::Error;

/// Errors that can occur during storage operations.
///
/// Only `NotFound` and `AlreadyExists` are classified; everything the
/// backend reports beyond that is carried verbatim in `Backend`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DatabaseError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("{0}")]
    Backend(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Callback failed: {0}")]
    Callback(String),
}

impl DatabaseError {
    /// Returns true if the error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Returns true if the error means the record was already present.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, DatabaseError::AlreadyExists { .. })
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
