//! # Shop Errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for product and order operations
pub type ShopResult<T> = Result<T, ShopError>;

/// Product catalog and order errors
#[derive(Debug, Clone, Error)]
pub enum ShopError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error("Order not found")]
    OrderNotFound,

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Could not persist record: {0}")]
    PersistFailure(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl ShopError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::ProductNotFound(_) => 404,
            ShopError::InvalidProduct(_) => 400,
            ShopError::OrderNotFound => 404,
            ShopError::InvalidOrder(_) => 400,
            ShopError::PersistFailure(_) => 500,
            ShopError::Corrupt(_) => 500,
            ShopError::StorageError(_) => 500,
        }
    }
}

impl From<StoreError> for ShopError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { .. } => ShopError::Corrupt(err.to_string()),
            other => ShopError::StorageError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::ProductNotFound("x".into()).status_code(), 404);
        assert_eq!(ShopError::InvalidOrder("x".into()).status_code(), 400);
        assert_eq!(ShopError::PersistFailure("x".into()).status_code(), 500);
    }
}
