//! Error types for series fetching and normalization
//!
//! Errors are classified by how the dashboard should react:
//! - Retryable: network issues, timeouts, data service hiccups
//! - NonRetryable: malformed payloads, bad dates, configuration errors
//! - Discarded: results superseded by a newer request, never rendered

use thiserror::Error;

/// Error types for the series pipeline
#[derive(Debug, Error)]
pub enum SeriesError {
    // Retryable errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Query timed out after {0} seconds")]
    Timeout(u64),

    #[error("Data service error {status}: {message}")]
    Api { status: u16, message: String },

    // Non-retryable errors
    #[error("Failed to decode query response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed value: {0}")]
    MalformedValue(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Query task failed: {0}")]
    Join(String),

    // Discarded
    #[error("Request {ticket} superseded by request {current}")]
    Superseded { ticket: u64, current: u64 },
}

impl SeriesError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            SeriesError::Network(_) | SeriesError::Timeout(_) => true,
            SeriesError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if the result should be dropped without showing an error
    pub fn is_superseded(&self) -> bool {
        matches!(self, SeriesError::Superseded { .. })
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SeriesError::Network(_) => "Check that the local data service is running and try again.",
            SeriesError::Timeout(_) => "The data service took too long. Try a shorter date range.",
            SeriesError::Api { .. } => "Check the data service logs for details.",
            SeriesError::Json(_) => "The data service returned an unexpected payload.",
            SeriesError::MalformedValue(_) => "Check the stored record for this metric.",
            SeriesError::InvalidDate(_) => "Use dates in YYYY-MM-DD format.",
            SeriesError::Configuration(_) => "Check your configuration in ~/.healthdash/config.json",
            SeriesError::Join(_) => "Try again.",
            SeriesError::Superseded { .. } => "A newer request replaced this one.",
        }
    }
}

impl From<reqwest::Error> for SeriesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return SeriesError::MalformedValue(err.to_string());
        }
        SeriesError::Network(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SeriesError {
    fn from(err: tokio::task::JoinError) -> Self {
        SeriesError::Join(err.to_string())
    }
}

/// Serializable error representation for the rendering layer
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesErrorPayload {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    Discarded,
}

impl From<&SeriesError> for SeriesErrorPayload {
    fn from(err: &SeriesError) -> Self {
        let error_type = if err.is_superseded() {
            ErrorType::Discarded
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        SeriesErrorPayload {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        let err = SeriesError::Api {
            status: 503,
            message: "busy".to_string(),
        };
        assert!(err.is_retryable());

        let err = SeriesError::Api {
            status: 404,
            message: "unknown path".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_payload_marks_superseded_as_discarded() {
        let err = SeriesError::Superseded { ticket: 3, current: 5 };
        let payload = SeriesErrorPayload::from(&err);
        assert_eq!(payload.error_type, ErrorType::Discarded);
        assert!(!payload.can_retry);
        assert!(payload.message.contains("superseded"));
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let err = SeriesError::Network("connection refused".to_string());
        let json = serde_json::to_value(SeriesErrorPayload::from(&err)).unwrap();
        assert_eq!(json["errorType"], "retryable");
        assert_eq!(json["canRetry"], true);
        assert!(json["recoverySuggestion"].as_str().unwrap().contains("data service"));
    }
}
