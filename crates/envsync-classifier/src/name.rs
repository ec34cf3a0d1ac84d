//! Validated identifiers shared by the master and the agent.

use crate::error::InvalidEnvironmentName;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Default naming rule for directory environments.
pub const DEFAULT_NAME_PATTERN: &str = "^[A-Za-z0-9_]+$";

fn default_regex() -> &'static Regex {
    static DEFAULT: OnceLock<Regex> = OnceLock::new();
    DEFAULT.get_or_init(|| Regex::new(DEFAULT_NAME_PATTERN).expect("default pattern compiles"))
}

/// The rule an environment name must satisfy.
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    /// Build a custom pattern. The pattern should be anchored.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

impl Default for NamePattern {
    fn default() -> Self {
        Self {
            regex: default_regex().clone(),
        }
    }
}

/// Name of a directory environment.
///
/// # Invariants
///
/// Non-empty and matching the [`NamePattern`] it was parsed with. There is no
/// way to mutate the inner string after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentName(String);

impl EnvironmentName {
    /// Parse with the default [`NamePattern`].
    pub fn parse(raw: &str) -> Result<Self, InvalidEnvironmentName> {
        Self::parse_with(raw, &NamePattern::default())
    }

    /// Parse with a caller-supplied naming rule.
    pub fn parse_with(raw: &str, pattern: &NamePattern) -> Result<Self, InvalidEnvironmentName> {
        if raw.is_empty() {
            return Err(InvalidEnvironmentName::Empty);
        }
        if !pattern.is_match(raw) {
            return Err(InvalidEnvironmentName::PatternMismatch {
                name: raw.to_string(),
                pattern: pattern.as_str().to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvironmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvironmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EnvironmentName {
    type Err = InvalidEnvironmentName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EnvironmentName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EnvironmentName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        EnvironmentName::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Certname of a managed node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
