//! Unified error handling for the cart store.

use crate::config::ConfigError;

/// Store error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cart accessed outside of an active cart provider")]
    MissingProvider,

    #[error("cart provider must be mounted inside a Tokio runtime")]
    NoRuntime,

    #[error("snapshot error: {0}")]
    Serialization(#[from] cart_engine::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("hydration failed: {0}")]
    Hydration(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            Error::MissingProvider.to_string(),
            "cart accessed outside of an active cart provider"
        );

        let err: Error = cart_engine::Error::DuplicateItem("p1".into()).into();
        assert_eq!(
            err.to_string(),
            "snapshot error: duplicate item in snapshot: p1"
        );
    }
}
