//! Structured observability hooks for environment resolution and agent runs.
//!
//! Events are emitted with an `event = "..."` field so they can be filtered
//! in JSON log pipelines (`--json`, or `RUST_LOG=envsync_core=debug`).

use tracing::{info, warn};

/// Span covering one agent run, tagged with `run_id` and `node`.
///
/// Attach it with `tracing::Instrument` so it stays correct across `.await`:
///
/// ```ignore
/// async { /* passes */ }.instrument(agent_run_span(&run_id, "web01")).await
/// ```
pub fn agent_run_span(run_id: &str, node: &str) -> tracing::Span {
    tracing::info_span!("envsync.agent_run", run_id = %run_id, node = %node)
}

pub fn emit_environment_resolved(name: &str, path: &std::path::Path) {
    info!(event = "environment.resolved", environment = %name, path = %path.display());
}

pub fn emit_environment_not_found(name: &str, search_path: &str) {
    warn!(
        event = "environment.not_found",
        environment = %name,
        search_path = %search_path,
    );
}

pub fn emit_degenerate_config(reason: &str) {
    warn!(event = "environment.degenerate_config", reason = %reason);
}

/// Emit event: negotiation finished with the given outcome tag.
pub fn emit_negotiated(assumed: &str, server: &str, found: bool, outcome: &str) {
    info!(
        event = "negotiation.decided",
        assumed = %assumed,
        server = %server,
        found = found,
        outcome = %outcome,
    );
}

pub fn emit_run_restarted(from: &str, to: &str, pass: usize) {
    info!(event = "agent.run_restarted", from = %from, to = %to, pass = pass);
}

pub fn emit_run_finished(run_id: &str, environment: &str, pluginsync: bool, restarts: usize) {
    info!(
        event = "agent.run_finished",
        run_id = %run_id,
        environment = %environment,
        pluginsync = pluginsync,
        restarts = restarts,
    );
}
