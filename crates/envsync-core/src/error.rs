//! Error taxonomy for envsync.

use crate::search_path::SearchPath;
use envsync_classifier::{ClassifierError, EnvironmentName, InvalidEnvironmentName};

/// The requested environment is absent from every root of the search path.
///
/// Carries the full search path so the rendered message lists every root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Could not find a directory environment named '{name}' anywhere in the path: {search_path}")]
pub struct ResolutionFailure {
    pub name: EnvironmentName,
    pub search_path: SearchPath,
}

/// Errors produced by environment resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    NotFound(#[from] ResolutionFailure),

    /// Search path is empty or malformed. Never reported as `NotFound`.
    #[error("degenerate environmentpath configuration: {0}")]
    DegenerateConfig(String),
}

impl ResolveError {
    /// Stable kind tag for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound(_) => "NOT_FOUND",
            ResolveError::DegenerateConfig(_) => "DEGENERATE_CONFIG",
        }
    }
}

/// Errors surfaced by an agent run.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("{0}")]
    Resolve(#[from] ResolveError),

    #[error("Catalog environment didn't stabilize after {tries} fetches, aborting run")]
    EnvironmentDidNotConverge { tries: usize },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors loading [`crate::settings::Settings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid environment setting: {0}")]
    InvalidEnvironment(#[from] InvalidEnvironmentName),

    #[error("invalid environmentpath setting: {0}")]
    InvalidSearchPath(String),
}

/// Result type for envsync-core operations.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_failure_message() {
        let failure = ResolutionFailure {
            name: EnvironmentName::parse("testing").unwrap(),
            search_path: SearchPath::from_roots(vec!["/doesnotexist".into()]),
        };
        #[cfg(unix)]
        assert_eq!(
            failure.to_string(),
            "Could not find a directory environment named 'testing' anywhere in the path: /doesnotexist"
        );
        let err = ResolveError::from(failure.clone());
        assert_eq!(err.to_string(), failure.to_string());
        assert_eq!(err.kind(), "NOT_FOUND");
    }

    #[test]
    fn test_degenerate_config_kind() {
        let err = ResolveError::DegenerateConfig("environmentpath is empty".to_string());
        assert_eq!(err.kind(), "DEGENERATE_CONFIG");
        assert!(err.to_string().contains("environmentpath is empty"));
    }

    #[test]
    fn test_did_not_converge_message() {
        let err = AgentError::EnvironmentDidNotConverge { tries: 4 };
        assert_eq!(
            err.to_string(),
            "Catalog environment didn't stabilize after 4 fetches, aborting run"
        );
    }
}
