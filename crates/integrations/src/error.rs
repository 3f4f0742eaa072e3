//! Error types shared by the Azure DevOps and JIRA clients.

use std::fmt;

use thiserror::Error;

/// Result alias used across the crate.
pub type IntegrationResult<T> = Result<T, IntegrationError>;

/// Errors that can occur while talking to an issue tracker.
///
/// Malformed relation URLs and mistyped fields never surface here; they
/// degrade the projected model instead.
#[derive(Error, Debug)]
pub enum IntegrationError {
    /// Missing or empty credential/URL. Not retryable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Request rejected before it was sent.
    #[error("Validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// Caller passed an argument the API cannot accept.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,
}

impl IntegrationError {
    /// Whether this error stems from missing configuration.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Name of the offending field (e.g. `summary`).
    pub field: &'static str,
    /// Human readable message.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_joins_messages() {
        let err = IntegrationError::Validation(vec![
            ValidationError::new("summary", "Summary is required"),
            ValidationError::new("project", "Project key is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: Summary is required; Project key is required"
        );
    }

    #[test]
    fn test_is_config() {
        assert!(IntegrationError::Config("JIRA_PAT".into()).is_config());
        assert!(!IntegrationError::Cancelled.is_config());
    }
}
