//! envsync-classifier: the node classifier boundary
//!
//! A classifier is an external service that assigns a node to an environment
//! (and a set of classes), overriding the environment the agent has configured
//! locally. This crate provides:
//!
//! - [`EnvironmentName`] / [`NodeId`]: validated identifiers
//! - [`Classifier`]: the async boundary trait
//! - [`HttpClassifier`]: a reqwest-backed client for a classifier service
//! - [`StaticClassifier`]: an in-memory table of classifications
//! - [`ClassifierGateway`]: decides which environment is authoritative

pub mod error;
pub mod gateway;
pub mod http;
pub mod name;

pub use error::{ClassifierError, InvalidEnvironmentName};
pub use gateway::ClassifierGateway;
pub use http::{HttpClassifier, HttpClassifierConfig};
pub use name::{EnvironmentName, NamePattern, NodeId, DEFAULT_NAME_PATTERN};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Result type for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Environment and classes assigned to a node by a classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub environment: EnvironmentName,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// A source of node classifications.
///
/// `Ok(None)` means the classifier has nothing for this node. Failing to reach
/// the classifier is an error, never `Ok(None)`.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, node: &NodeId) -> Result<Option<Classification>>;
}

/// Classifications held in memory, keyed by node name.
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    nodes: HashMap<String, Classification>,
}

impl StaticClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_node(mut self, node: &str, classification: Classification) -> Self {
        self.nodes.insert(node.to_string(), classification);
        self
    }

    /// Load a JSON object of `{ "<node>": { "environment": ..., "classes": [...] } }`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let nodes: HashMap<String, Classification> = serde_json::from_str(&content)?;
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[async_trait]
impl Classifier for StaticClassifier {
    async fn classify(&self, node: &NodeId) -> Result<Option<Classification>> {
        Ok(self.nodes.get(node.as_str()).cloned())
    }
}
