//! Picks the authoritative environment for a node.

use crate::name::{EnvironmentName, NodeId};
use crate::{Classifier, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Wraps an optional [`Classifier`].
///
/// With no classifier configured the agent's own environment is authoritative,
/// so no mismatch is possible.
#[derive(Clone, Default)]
pub struct ClassifierGateway {
    classifier: Option<Arc<dyn Classifier>>,
}

impl ClassifierGateway {
    /// Gateway with no classifier: the configured environment always wins.
    pub fn absent() -> Self {
        Self { classifier: None }
    }

    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier: Some(classifier),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.classifier.is_some()
    }

    /// The environment the server treats as authoritative for `node`.
    ///
    /// Classifier transport failures propagate as errors.
    pub async fn server_environment(
        &self,
        node: &NodeId,
        configured: &EnvironmentName,
    ) -> Result<EnvironmentName> {
        let Some(classifier) = &self.classifier else {
            debug!(node = %node, environment = %configured, "no classifier configured");
            return Ok(configured.clone());
        };

        match classifier.classify(node).await? {
            Some(classification) => {
                info!(
                    event = "classifier.classified",
                    node = %node,
                    environment = %classification.environment,
                    classes = classification.classes.len(),
                );
                Ok(classification.environment)
            }
            None => {
                debug!(node = %node, "classifier has no entry, keeping agent environment");
                Ok(configured.clone())
            }
        }
    }
}

impl std::fmt::Debug for ClassifierGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierGateway")
            .field("configured", &self.is_configured())
            .finish()
    }
}
