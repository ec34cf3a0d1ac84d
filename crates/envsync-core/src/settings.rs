//! Runtime settings shared by the master and agent sides.

use crate::error::SettingsError;
use crate::search_path::SearchPath;
use envsync_classifier::EnvironmentName;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENVIRONMENTPATH: &str = "/etc/envsync/code/environments";
pub const DEFAULT_ENVIRONMENT: &str = "production";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Roots searched for directory environments
    pub environmentpath: SearchPath,
    /// Environment the agent assumes locally
    pub environment: EnvironmentName,
    /// Environment the master compiles with when the requested one is missing
    pub default_environment: EnvironmentName,
    /// Classifier service, when one is configured
    pub classifier_url: Option<String>,
    /// This node's certname
    pub node: String,
}

impl Settings {
    /// Build settings from explicit values. The search path must be usable.
    pub fn new(
        environmentpath: &str,
        environment: &str,
        classifier_url: Option<String>,
        node: &str,
    ) -> Result<Self, SettingsError> {
        let environmentpath = SearchPath::parse(environmentpath);
        environmentpath
            .validate()
            .map_err(SettingsError::InvalidSearchPath)?;

        Ok(Settings {
            environmentpath,
            environment: EnvironmentName::parse(environment)?,
            default_environment: EnvironmentName::parse(DEFAULT_ENVIRONMENT)?,
            classifier_url: classifier_url.filter(|u| !u.trim().is_empty()),
            node: node.to_string(),
        })
    }

    /// Read `ENVSYNC_ENVIRONMENTPATH`, `ENVSYNC_ENVIRONMENT`,
    /// `ENVSYNC_CLASSIFIER_URL` and `ENVSYNC_NODE`.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Settings::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let environmentpath = lookup("ENVSYNC_ENVIRONMENTPATH")
            .unwrap_or_else(|| DEFAULT_ENVIRONMENTPATH.to_string());
        let environment =
            lookup("ENVSYNC_ENVIRONMENT").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let node = lookup("ENVSYNC_NODE")
            .or_else(|| lookup("HOSTNAME"))
            .unwrap_or_else(|| "localhost".to_string());

        Self::new(
            &environmentpath,
            &environment,
            lookup("ENVSYNC_CLASSIFIER_URL"),
            &node,
        )
    }

    pub fn with_default_environment(mut self, environment: EnvironmentName) -> Self {
        self.default_environment = environment;
        self
    }
}
