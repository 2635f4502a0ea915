//! Error types for paginated query operations

use thiserror::Error;

/// Errors that can occur while building or running a paginated query
///
/// Invalid sort fields and includes are not errors: they are dropped before
/// the query is built. Only custom parameter binding, malformed dynamic
/// conditions and store failures surface here.
#[derive(Debug, Error)]
pub enum PagerError {
    #[error("Binding error: {0}")]
    Binding(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PagerError {
    pub fn binding(msg: impl Into<String>) -> Self {
        Self::Binding(msg.into())
    }

    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Whether the error was caused by the client's request rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Binding(_) | Self::InvalidFilter(_))
    }
}

pub type Result<T> = std::result::Result<T, PagerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PagerError::binding("province_id must be an integer").to_string(),
            "Binding error: province_id must be an integer"
        );
        assert_eq!(
            PagerError::invalid_filter("unknown operator 'BETWEEN'").to_string(),
            "Invalid filter: unknown operator 'BETWEEN'"
        );
        assert_eq!(PagerError::store("gone").to_string(), "Store error: gone");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(PagerError::binding("x").is_client_error());
        assert!(PagerError::invalid_filter("x").is_client_error());
        assert!(!PagerError::store("x").is_client_error());
        assert!(!PagerError::Sql(sqlx::Error::RowNotFound).is_client_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: PagerError = serde_json::from_str::<i32>("nope").unwrap_err().into();
        assert!(matches!(err, PagerError::Json(_)));
    }
}
