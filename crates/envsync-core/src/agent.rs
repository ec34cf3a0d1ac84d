//! Agent run driver.
//!
//! Each pass asks the master about the node's environment, negotiates, then
//! fetches the catalog environment and negotiates again. A mismatch at either
//! point restarts the pass with the server's environment; the run aborts if
//! the environment has not settled after [`MAX_ENVIRONMENT_FETCHES`] passes.

use crate::diagnostics::{Diagnostic, EnglishLocalizer, Localizer};
use crate::error::{AgentError, Result};
use crate::negotiation::{negotiate, NegotiationInput, NegotiationOutcome, ServerReport};
use crate::obs;
use async_trait::async_trait;
use envsync_classifier::{EnvironmentName, NodeId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Instrument};

pub const MAX_ENVIRONMENT_FETCHES: usize = 4;

/// The agent's view of the master. Implementations own all network waits.
#[async_trait]
pub trait MasterConnection: Send + Sync {
    /// Ask the master which environment it holds for `node`.
    async fn node_environment(
        &self,
        node: &NodeId,
        environment: &EnvironmentName,
    ) -> Result<ServerReport>;

    /// Environment the master actually compiled the catalog in.
    async fn catalog_environment(
        &self,
        node: &NodeId,
        environment: &EnvironmentName,
    ) -> Result<EnvironmentName>;
}

/// Summary of a completed agent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    /// Environment the run settled on
    pub environment: EnvironmentName,
    /// Whether pluginsync ran on the final pass
    pub pluginsync: bool,
    pub restarts: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    pub fn rendered(&self, localizer: &dyn Localizer) -> Vec<String> {
        self.diagnostics.iter().map(|d| localizer.render(d)).collect()
    }
}

pub struct AgentRunner<M> {
    master: M,
    max_fetches: usize,
    localizer: Box<dyn Localizer>,
}

impl<M: MasterConnection> AgentRunner<M> {
    pub fn new(master: M) -> Self {
        Self {
            master,
            max_fetches: MAX_ENVIRONMENT_FETCHES,
            localizer: Box::new(EnglishLocalizer),
        }
    }

    pub fn with_max_fetches(mut self, max_fetches: usize) -> Self {
        self.max_fetches = max_fetches.max(1);
        self
    }

    pub fn with_localizer(mut self, localizer: Box<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    /// Run until the environment settles, starting from `configured`.
    pub async fn run(&self, node: &NodeId, configured: &EnvironmentName) -> Result<RunReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = obs::agent_run_span(&run_id, node.as_str());
        self.run_passes(run_id, node, configured)
            .instrument(span)
            .await
    }

    async fn run_passes(
        &self,
        run_id: String,
        node: &NodeId,
        configured: &EnvironmentName,
    ) -> Result<RunReport> {
        let mut environment = configured.clone();
        let mut diagnostics = Vec::new();
        let mut restarts = 0;

        for pass in 1..=self.max_fetches {
            debug!(pass = pass, environment = %environment, "starting agent pass");

            let report = self.master.node_environment(node, &environment).await?;
            let locale = report.locale.clone();
            let decision = negotiate(&NegotiationInput::new(environment.clone(), report));
            self.record(&mut diagnostics, decision.diagnostic);

            let pluginsync = match decision.outcome {
                NegotiationOutcome::RestartWithEnvironment(next) => {
                    obs::emit_run_restarted(environment.as_str(), next.as_str(), pass);
                    environment = next;
                    restarts += 1;
                    continue;
                }
                NegotiationOutcome::SkipPluginSync => false,
                NegotiationOutcome::Proceed => true,
            };

            let compiled = self.master.catalog_environment(node, &environment).await?;
            let mut catalog_report = ServerReport::found(compiled);
            catalog_report.locale = locale;
            let decision = negotiate(&NegotiationInput::new(environment.clone(), catalog_report));
            self.record(&mut diagnostics, decision.diagnostic);

            if let NegotiationOutcome::RestartWithEnvironment(next) = decision.outcome {
                obs::emit_run_restarted(environment.as_str(), next.as_str(), pass);
                environment = next;
                restarts += 1;
                continue;
            }

            obs::emit_run_finished(&run_id, environment.as_str(), pluginsync, restarts);
            return Ok(RunReport {
                run_id,
                environment,
                pluginsync,
                restarts,
                diagnostics,
            });
        }

        Err(AgentError::EnvironmentDidNotConverge {
            tries: self.max_fetches,
        })
    }

    fn record(&self, diagnostics: &mut Vec<Diagnostic>, diagnostic: Option<Diagnostic>) {
        if let Some(diagnostic) = diagnostic {
            info!(code = diagnostic.code(), "{}", self.localizer.render(&diagnostic));
            diagnostics.push(diagnostic);
        }
    }
}
