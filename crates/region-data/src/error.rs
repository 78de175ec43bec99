//! Data access errors.

use region_core::RenderError;

/// Error type for data provider operations.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Item not found: {domain} {id}")]
    NotFound { domain: String, id: String },

    #[error("Invalid criteria: {0}")]
    InvalidCriteria(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<DataError> for RenderError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound { .. } | DataError::InvalidCriteria(_) => {
                RenderError::storage(err.to_string())
            }
            DataError::Backend(_) => RenderError::Unexpected(anyhow::Error::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_recoverable() {
        let err: RenderError = DataError::NotFound {
            domain: "product".to_string(),
            id: "9".to_string(),
        }
        .into();

        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "Item not found: product 9");
    }

    #[test]
    fn test_backend_error_is_unexpected() {
        let err: RenderError = DataError::Backend("pool exhausted".to_string()).into();
        assert!(matches!(err, RenderError::Unexpected(_)));
    }
}
