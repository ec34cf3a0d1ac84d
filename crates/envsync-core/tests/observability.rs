//! Structured tracing events for resolution, negotiation, and agent runs.

use envsync_core::obs::{emit_run_finished, emit_run_restarted};
use envsync_core::{
    negotiate, resolve, AgentRunner, ClassifierGateway, Diagnostic, EnvironmentName,
    LocalMaster, Localizer, NegotiationInput, NodeId, SearchPath, ServerReport,
};
use tempfile::tempdir;
use tracing_test::traced_test;

fn env(name: &str) -> EnvironmentName {
    EnvironmentName::parse(name).unwrap()
}

#[traced_test]
#[test]
fn resolved_environment_is_logged() {
    let root = tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("production")).unwrap();
    let sp = SearchPath::from_roots(vec![root.path().to_path_buf()]);

    resolve(&env("production"), &sp).unwrap();
    assert!(logs_contain("environment.resolved"));
}

#[traced_test]
#[test]
fn missing_environment_is_logged_as_warning() {
    let sp = SearchPath::from_roots(vec!["/doesnotexist".into()]);
    resolve(&env("testing"), &sp).unwrap_err();

    assert!(logs_contain("environment.not_found"));
    assert!(logs_contain("WARN"));
}

#[traced_test]
#[test]
fn degenerate_config_is_logged() {
    resolve(&env("testing"), &SearchPath::from_roots(Vec::new())).unwrap_err();
    assert!(logs_contain("environment.degenerate_config"));
}

#[traced_test]
#[test]
fn negotiation_logs_outcome() {
    negotiate(&NegotiationInput::new(
        env("testing"),
        ServerReport::found(env("production")),
    ));
    assert!(logs_contain("negotiation.decided"));
    assert!(logs_contain("restart_with_environment"));
}

#[traced_test]
#[test]
fn run_lifecycle_emitters_do_not_panic() {
    emit_run_restarted("testing", "production", 1);
    emit_run_finished("run-001", "production", false, 1);
    assert!(logs_contain("agent.run_finished"));
}

#[traced_test]
#[tokio::test]
async fn agent_run_logs_rendered_diagnostics() {
    let master = LocalMaster::new(
        SearchPath::from_roots(vec!["/doesnotexist".into()]),
        ClassifierGateway::absent(),
        env("production"),
    );
    AgentRunner::new(master)
        .run(&NodeId::new("web01"), &env("testing"))
        .await
        .unwrap();

    assert!(logs_contain("not found on server, skipping initial pluginsync"));
    assert!(logs_contain("envsync.agent_run"));
}

struct CodeOnly;

impl Localizer for CodeOnly {
    fn render(&self, diagnostic: &Diagnostic) -> String {
        format!("[{}]", diagnostic.code())
    }
}

#[traced_test]
#[tokio::test]
async fn agent_run_logs_through_configured_localizer() {
    let master = LocalMaster::new(
        SearchPath::from_roots(vec!["/doesnotexist".into()]),
        ClassifierGateway::absent(),
        env("production"),
    );
    let report = AgentRunner::new(master)
        .with_localizer(Box::new(CodeOnly))
        .run(&NodeId::new("web01"), &env("testing"))
        .await
        .unwrap();

    assert!(logs_contain("[ENV_NOT_FOUND_SKIP_SYNC]"));
    assert!(logs_contain("[ENV_MISMATCH_RESTART]"));
    assert_eq!(
        report.rendered(&CodeOnly),
        vec!["[ENV_NOT_FOUND_SKIP_SYNC]", "[ENV_MISMATCH_RESTART]"]
    );
}
