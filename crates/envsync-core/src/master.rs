//! Master-side request handling.
//!
//! [`respond_environment`] renders a resolution into a [`ResponseBuffer`];
//! [`LocalMaster`] answers an agent in-process using the classifier gateway
//! and the resolver.

use crate::agent::MasterConnection;
use crate::error::{ResolveError, Result};
use crate::negotiation::ServerReport;
use crate::resolver::resolve;
use crate::response::{ResponseBuffer, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
use crate::search_path::SearchPath;
use crate::settings::Settings;
use async_trait::async_trait;
use envsync_classifier::{ClassifierGateway, EnvironmentName, NodeId};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: String,
    issue_kind: &'a str,
}

fn write_json<T: Serialize>(response: &mut ResponseBuffer, status: u16, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => response.respond_with(status, CONTENT_TYPE_JSON, bytes),
        Err(e) => response.respond_with(500, CONTENT_TYPE_TEXT, e.to_string()),
    }
}

fn write_error(response: &mut ResponseBuffer, status: u16, issue_kind: &str, message: String) {
    write_json(response, status, &ErrorBody { message, issue_kind });
}

/// Resolve `raw_name` and describe the result as an HTTP response.
///
/// | outcome | status |
/// |---|---|
/// | resolved | 200 |
/// | invalid name | 400 |
/// | `NOT_FOUND` | 404 |
/// | `DEGENERATE_CONFIG` | 500 |
pub fn respond_environment(raw_name: &str, search_path: &SearchPath) -> ResponseBuffer {
    let mut response = ResponseBuffer::new();

    let name = match EnvironmentName::parse(raw_name) {
        Ok(name) => name,
        Err(e) => {
            write_error(&mut response, 400, "INVALID_ENVIRONMENT_NAME", e.to_string());
            return response;
        }
    };

    match resolve(&name, search_path) {
        Ok(resolved) => write_json(&mut response, 200, &resolved),
        Err(err) => {
            let status = match err {
                ResolveError::NotFound(_) => 404,
                ResolveError::DegenerateConfig(_) => 500,
            };
            write_error(&mut response, status, err.kind(), err.to_string());
        }
    }

    response
}

/// An in-process master.
#[derive(Debug, Clone)]
pub struct LocalMaster {
    search_path: SearchPath,
    gateway: ClassifierGateway,
    default_environment: EnvironmentName,
    locale: Option<String>,
}

impl LocalMaster {
    /// `default_environment` is what catalogs compile in when the assigned
    /// environment is missing.
    pub fn new(
        search_path: SearchPath,
        gateway: ClassifierGateway,
        default_environment: EnvironmentName,
    ) -> Self {
        Self {
            search_path,
            gateway,
            default_environment,
            locale: None,
        }
    }

    pub fn from_settings(settings: &Settings, gateway: ClassifierGateway) -> Self {
        Self::new(
            settings.environmentpath.clone(),
            gateway,
            settings.default_environment.clone(),
        )
    }

    /// Locale tag attached to every report.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[async_trait]
impl MasterConnection for LocalMaster {
    async fn node_environment(
        &self,
        node: &NodeId,
        environment: &EnvironmentName,
    ) -> Result<ServerReport> {
        let assigned = self.gateway.server_environment(node, environment).await?;

        let mut report = match resolve(&assigned, &self.search_path) {
            Ok(_) => ServerReport::found(assigned),
            Err(ResolveError::NotFound(_)) => ServerReport::not_found(assigned),
            Err(e) => return Err(e.into()),
        };
        report.locale = self.locale.clone();
        Ok(report)
    }

    async fn catalog_environment(
        &self,
        node: &NodeId,
        environment: &EnvironmentName,
    ) -> Result<EnvironmentName> {
        let assigned = self.gateway.server_environment(node, environment).await?;

        match resolve(&assigned, &self.search_path) {
            Ok(resolved) => Ok(resolved.name),
            Err(ResolveError::NotFound(failure)) => {
                warn!(
                    "{}; compiling with environment '{}'",
                    failure, self.default_environment
                );
                Ok(self.default_environment.clone())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn env(name: &str) -> EnvironmentName {
        EnvironmentName::parse(name).unwrap()
    }

    #[test]
    fn test_respond_invalid_name_is_400() {
        let sp = SearchPath::from_roots(vec!["/doesnotexist".into()]);
        let response = respond_environment("../etc", &sp);
        assert_eq!(response.status(), Some(400));
        assert_eq!(response.content_type(), Some(CONTENT_TYPE_JSON));

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["issue_kind"], "INVALID_ENVIRONMENT_NAME");
    }

    #[test]
    fn test_respond_degenerate_is_500() {
        let response = respond_environment("production", &SearchPath::from_roots(Vec::new()));
        assert_eq!(response.status(), Some(500));

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["issue_kind"], "DEGENERATE_CONFIG");
    }

    #[test]
    fn test_respond_resolved_is_200() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("production").join("modules")).unwrap();
        let sp = SearchPath::from_roots(vec![root.path().to_path_buf()]);

        let response = respond_environment("production", &sp);
        assert!(response.is_success());

        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["name"], "production");
        assert_eq!(body["modules"], true);
        assert_eq!(body["manifests"], false);
    }

    #[tokio::test]
    async fn test_catalog_falls_back_to_default_environment() {
        let master = LocalMaster::new(
            SearchPath::from_roots(vec!["/doesnotexist".into()]),
            ClassifierGateway::absent(),
            env("production"),
        );
        let compiled = master
            .catalog_environment(&NodeId::new("web01"), &env("testing"))
            .await
            .unwrap();
        assert_eq!(compiled, env("production"));
    }

    #[tokio::test]
    async fn test_node_report_carries_locale() {
        let master = LocalMaster::new(
            SearchPath::from_roots(vec!["/doesnotexist".into()]),
            ClassifierGateway::absent(),
            env("production"),
        )
        .with_locale("ja");
        let report = master
            .node_environment(&NodeId::new("web01"), &env("testing"))
            .await
            .unwrap();
        assert!(!report.found);
        assert_eq!(report.locale.as_deref(), Some("ja"));
    }
}
