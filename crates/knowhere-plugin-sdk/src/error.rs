//! Contract-side error type.

use thiserror::Error;

/// Errors produced by extension code behind the capability surface.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A caller-supplied argument (dataset, config, id) was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgs(String),

    /// The extension declines this optional capability.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A serialization payload was missing or malformed.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Internal extension failure.
    #[error("internal: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::Serialization(err.to_string())
    }
}

/// Result type for capability-surface operations.
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::InvalidArgs("dim must be positive".to_string());
        assert_eq!(err.to_string(), "invalid argument: dim must be positive");

        let err = IndexError::NotImplemented("range_search".to_string());
        assert!(err.to_string().contains("not implemented"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: IndexError = parse_err.into();
        assert!(matches!(err, IndexError::Serialization(_)));
    }
}
