//! Error types for the cart engine.

use crate::ProductId;
use thiserror::Error;

/// All possible errors from the cart engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // State errors
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("duplicate item in snapshot: {0}")]
    DuplicateItem(ProductId),

    #[error("invalid quantity for item '{id}': quantity must be at least 1")]
    InvalidQuantity { id: ProductId },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::DuplicateItem("p1".into());
        assert_eq!(err.to_string(), "duplicate item in snapshot: p1");

        let err = Error::InvalidQuantity { id: "p2".into() };
        assert_eq!(
            err.to_string(),
            "invalid quantity for item 'p2': quantity must be at least 1"
        );

        let err = Error::InvalidSnapshot("expected array".into());
        assert_eq!(err.to_string(), "invalid snapshot: expected array");
    }
}
