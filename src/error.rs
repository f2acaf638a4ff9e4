//! Error types for RateDesk

use thiserror::Error;

/// Main error type for RateDesk
#[derive(Error, Debug)]
pub enum RateDeskError {
    // Session errors
    #[error("Negotiation session is closed: {0}")]
    SessionClosed(String),

    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    #[error("No lowball confirmation pending for session: {0}")]
    NoPendingConfirmation(String),

    // Policy / configuration errors
    #[error("Invalid policy value: {0}")]
    InvalidPolicy(String),

    // Replay / script errors
    #[error("Invalid replay script: {0}")]
    InvalidScript(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for RateDesk operations
pub type Result<T> = std::result::Result<T, RateDeskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RateDeskError::SessionClosed("sess_123".to_string());
        assert_eq!(err.to_string(), "Negotiation session is closed: sess_123");
    }

    #[test]
    fn test_result_type() {
        fn sample_function() -> Result<f64> {
            Ok(42.0)
        }

        let result = sample_function();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42.0);
    }

    #[test]
    fn test_error_conversion() {
        fn io_error_function() -> Result<()> {
            std::fs::read_to_string("/nonexistent/file")?;
            Ok(())
        }

        let result = io_error_function();
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), RateDeskError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        fn parse_function() -> Result<serde_json::Value> {
            let v = serde_json::from_str("{not json")?;
            Ok(v)
        }

        let result = parse_function();
        assert!(matches!(result.unwrap_err(), RateDeskError::Json(_)));
    }
}
