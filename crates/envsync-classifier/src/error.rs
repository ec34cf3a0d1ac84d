//! Error types for envsync-classifier

use thiserror::Error;

/// An environment name that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidEnvironmentName {
    /// Empty string
    #[error("environment name must not be empty")]
    Empty,

    /// Contains characters outside the naming pattern
    #[error("invalid environment name '{name}': must match {pattern}")]
    PatternMismatch { name: String, pattern: String },
}

/// Errors that can occur while talking to a node classifier
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Classifier could not be reached (connection refused, timeout, DNS)
    #[error("classifier unavailable at {endpoint}: {reason}")]
    Unavailable { endpoint: String, reason: String },

    /// Classifier endpoint is not a usable base URL
    #[error("invalid classifier endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Node name cannot be addressed as a single URL path segment
    #[error("node name '{0}' cannot be sent to the classifier")]
    InvalidNode(String),

    /// Classifier answered with a status we do not understand
    #[error("classifier returned HTTP {status} for node '{node}'")]
    BadResponse { node: String, status: u16 },

    /// Response body could not be decoded
    #[error("failed to decode classifier response: {0}")]
    Decode(String),

    /// Classifier assigned an environment name that does not validate
    #[error("classifier assigned an invalid environment: {0}")]
    InvalidEnvironment(#[from] InvalidEnvironmentName),

    /// IO error (classification files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (classification files)
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClassifierError {
    /// Stable kind tag, used in structured logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ClassifierError::Unavailable { .. } => "CLASSIFIER_UNAVAILABLE",
            ClassifierError::InvalidEndpoint { .. } => "CLASSIFIER_CONFIG",
            ClassifierError::InvalidNode(_) => "INVALID_NODE",
            ClassifierError::BadResponse { .. } => "CLASSIFIER_BAD_RESPONSE",
            ClassifierError::Decode(_) | ClassifierError::Json(_) => "CLASSIFIER_DECODE",
            ClassifierError::InvalidEnvironment(_) => "INVALID_ENVIRONMENT_NAME",
            ClassifierError::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display_names_endpoint() {
        let err = ClassifierError::Unavailable {
            endpoint: "https://classifier.example.com".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("classifier unavailable"));
        assert!(msg.contains("https://classifier.example.com"));
        assert_eq!(err.kind(), "CLASSIFIER_UNAVAILABLE");
    }

    #[test]
    fn test_bad_response_display() {
        let err = ClassifierError::BadResponse {
            node: "agent01".to_string(),
            status: 409,
        };
        assert!(err.to_string().contains("409"));
        assert!(err.to_string().contains("agent01"));
    }
}
