//! # Auth Errors
//!
//! Error types for the credential vault and session token service.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Identity Errors
    // ==================

    /// Registration for an identity that already has a record
    #[error("A user with that email already exists")]
    IdentityExists,

    /// No identity record for the given id
    #[error("Specified user does not exist")]
    IdentityNotFound,

    /// Unknown identity or wrong secret (generic - don't leak which)
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ==================
    // Token Errors
    // ==================

    /// No token record for the given id
    #[error("Specified token does not exist")]
    TokenNotFound,

    /// Token expiry is at or before the current time
    #[error("The token has already expired and cannot be extended")]
    TokenExpired,

    // ==================
    // Internal Errors
    // ==================

    /// Secret hashing failed
    #[error("Internal error: secret hashing failed")]
    HashFailure,

    /// A record could not be written (includes token id collisions)
    #[error("Could not persist record: {0}")]
    PersistFailure(String),

    /// Stored record could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Any other storage failure
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::IdentityExists => 400,
            AuthError::TokenExpired => 400,
            AuthError::InvalidCredentials => 400,
            AuthError::IdentityNotFound => 404,
            AuthError::TokenNotFound => 404,
            AuthError::HashFailure => 500,
            AuthError::PersistFailure(_) => 500,
            AuthError::Corrupt(_) => 500,
            AuthError::StorageError(_) => 500,
        }
    }
}

impl From<StoreError> for AuthError {
    /// Fallback mapping for store failures that have no domain meaning at
    /// the call site. Existence failures are mapped explicitly by callers.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { .. } => AuthError::Corrupt(err.to_string()),
            other => AuthError::StorageError(other.to_string()),
        }
    }
}
