//! HTTP node classifier client
//!
//! Talks to a classifier service that answers
//! `POST {endpoint}/v1/classified/nodes/{node}` with the node's environment
//! and classes.

use crate::error::ClassifierError;
use crate::name::{EnvironmentName, NodeId};
use crate::{Classification, Classifier, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Classifier client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClassifierConfig {
    /// Base URL of the classifier service
    pub endpoint: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl HttpClassifierConfig {
    /// Create config for a specific endpoint
    pub fn new(endpoint: &str) -> Self {
        HttpClassifierConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout_secs: 10,
        }
    }

    /// Override the request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    fact: Facts<'a>,
}

#[derive(Serialize)]
struct Facts<'a> {
    clientcert: &'a str,
}

#[derive(Deserialize)]
struct ClassifiedNode {
    environment: String,
    #[serde(default)]
    classes: serde_json::Value,
}

/// Class lists arrive either as an array of names or as an object keyed by
/// class name (parameters as values).
fn class_names(classes: serde_json::Value) -> Vec<String> {
    match classes {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        serde_json::Value::Object(map) => map.into_iter().map(|(k, _)| k).collect(),
        _ => Vec::new(),
    }
}

/// Classifier backed by a remote HTTP service
pub struct HttpClassifier {
    config: HttpClassifierConfig,
    base: reqwest::Url,
    http_client: reqwest::Client,
}

impl HttpClassifier {
    /// Create a new client
    pub fn new(config: HttpClassifierConfig) -> Result<Self> {
        let base = reqwest::Url::parse(&config.endpoint).map_err(|e| {
            ClassifierError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        if base.cannot_be_a_base() {
            return Err(ClassifierError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: "not a base URL".to_string(),
            });
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("envsync-classifier/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Unavailable {
                endpoint: config.endpoint.clone(),
                reason: e.to_string(),
            })?;

        Ok(HttpClassifier {
            config,
            base,
            http_client,
        })
    }

    /// Node URL with the certname percent-encoded as a single path segment.
    fn node_url(&self, node: &NodeId) -> Result<reqwest::Url> {
        let name = node.as_str();
        // the url crate drops dot segments instead of encoding them
        if name.is_empty() || name == "." || name == ".." {
            return Err(ClassifierError::InvalidNode(name.to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClassifierError::InvalidEndpoint {
                endpoint: self.config.endpoint.clone(),
                reason: "not a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(["v1", "classified", "nodes", name]);
        Ok(url)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, node: &NodeId) -> Result<Option<Classification>> {
        let url = self.node_url(node)?;
        debug!("Classifying node {} via {}", node, url);

        let response = self
            .http_client
            .post(url)
            .json(&ClassifyRequest {
                fact: Facts {
                    clientcert: node.as_str(),
                },
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Classifier request failed: {}", e);
                ClassifierError::Unavailable {
                    endpoint: self.config.endpoint.clone(),
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("Classifier has no entry for {}", node);
            return Ok(None);
        }
        if status.is_server_error() {
            warn!("Classifier answered {} for {}", status, node);
            return Err(ClassifierError::Unavailable {
                endpoint: self.config.endpoint.clone(),
                reason: format!("HTTP {}", status),
            });
        }
        if !status.is_success() {
            return Err(ClassifierError::BadResponse {
                node: node.to_string(),
                status: status.as_u16(),
            });
        }

        let body: ClassifiedNode = response
            .json()
            .await
            .map_err(|e| ClassifierError::Decode(e.to_string()))?;

        Ok(Some(Classification {
            environment: EnvironmentName::parse(&body.environment)?,
            classes: class_names(body.classes),
        }))
    }
}
