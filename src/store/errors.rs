//! # Record Store Errors

use thiserror::Error;

/// Result type for record store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
///
/// Existence failures carry the `(collection, id)` key they were raised for.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A record already exists for this key
    #[error("Record already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// No record exists for this key
    #[error("Record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Stored bytes could not be decoded
    #[error("Corrupt record {collection}/{id}: {reason}")]
    Corrupt {
        collection: String,
        id: String,
        reason: String,
    },

    /// Collection or id is not a safe file name
    #[error("Invalid record key: {0}")]
    InvalidKey(String),

    /// Value could not be encoded as JSON
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    pub(crate) fn already_exists(collection: &str, id: &str) -> Self {
        StoreError::AlreadyExists {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn corrupt(collection: &str, id: &str, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true for the `NotFound` variant
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::AlreadyExists { .. } => 400,
            StoreError::NotFound { .. } => 404,
            StoreError::InvalidKey(_) => 400,
            StoreError::Corrupt { .. } => 500,
            StoreError::Encoding(_) => 500,
            StoreError::Io(_) => 500,
        }
    }
}
