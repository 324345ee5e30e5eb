//! Error types for cuadre
//!
//! Every failure carries an HTTP-style status so callers can surface a
//! structured response (404 for missing entities, 400 for bad input, 500 for
//! infrastructure problems).

use thiserror::Error;

/// The main error type for cuadre operations
#[derive(Error, Debug)]
pub enum CuadreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Malformed input (dates, amounts, directions, paging)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A record the calculation depends on is absent
    #[error("{entity_type} {identifier} is missing its {dependency}")]
    MissingDependency {
        entity_type: &'static str,
        identifier: String,
        dependency: &'static str,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Every scraper key is exhausted or disabled
    #[error("No scraper API keys available: {0}")]
    NoKeysAvailable(String),

    /// Remote credit lookup failures
    #[error("HTTP error: {0}")]
    Http(String),
}

impl CuadreError {
    /// Create a "not found" error for operations
    pub fn operation_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Operation",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for reconciliation records
    pub fn record_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Reconciliation record",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for reconciliation entries
    pub fn entry_not_found(entity_type: &'static str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for scraper keys
    pub fn key_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Scraper key",
            identifier: identifier.into(),
        }
    }

    /// An operation without its cash-flow record
    pub fn missing_cash_flow(identifier: impl Into<String>) -> Self {
        Self::MissingDependency {
            entity_type: "Operation",
            identifier: identifier.into(),
            dependency: "cash-flow record",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// HTTP-style status code for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Import(_) => 400,
            Self::NotFound { .. } => 404,
            Self::MissingDependency { .. } | Self::Duplicate { .. } => 409,
            Self::NoKeysAvailable(_) => 503,
            Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Export(_)
            | Self::Storage(_)
            | Self::Http(_) => 500,
        }
    }

    /// Whether the failure came from the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<std::io::Error> for CuadreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CuadreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for CuadreError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<reqwest::Error> for CuadreError {
    /// The URL is dropped; it can carry credentials in its query string
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url().to_string())
    }
}

/// Result type alias for cuadre operations
pub type CuadreResult<T> = Result<T, CuadreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reqwest_error_drops_url() {
        let err = reqwest::blocking::get("http://127.0.0.1:1/account?api_key=SUPERSECRETKEY123")
            .unwrap_err();
        let converted = CuadreError::from(err);
        assert!(!converted.to_string().contains("SUPERSECRETKEY123"));
    }

    #[test]
    fn test_error_display() {
        let err = CuadreError::Validation("bad date".into());
        assert_eq!(err.to_string(), "Validation error: bad date");
    }

    #[test]
    fn test_not_found_error() {
        let err = CuadreError::operation_not_found("13157");
        assert_eq!(err.to_string(), "Operation not found: 13157");
        assert!(err.is_not_found());
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_missing_dependency_error() {
        let err = CuadreError::missing_cash_flow("#14775");
        assert_eq!(
            err.to_string(),
            "Operation #14775 is missing its cash-flow record"
        );
        assert_eq!(err.status_code(), 409);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_infrastructure_errors_are_500() {
        assert_eq!(CuadreError::Storage("lock".into()).status_code(), 500);
        assert_eq!(CuadreError::Http("timeout".into()).status_code(), 500);
        assert!(!CuadreError::Io("disk".into()).is_client_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CuadreError = io_err.into();
        assert!(matches!(err, CuadreError::Io(_)));
    }
}
