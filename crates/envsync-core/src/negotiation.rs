//! Agent-side environment negotiation.
//!
//! Compares the environment the agent assumed locally with what the server
//! reported and decides whether to proceed, skip pluginsync, or restart the
//! run with the server's environment. [`negotiate`] is a pure function;
//! [`NegotiationStateMachine`] tracks the state for one run.

use crate::diagnostics::{Diagnostic, DiagnosticKey};
use crate::obs;
use envsync_classifier::EnvironmentName;
use serde::{Deserialize, Serialize};

/// What the server said about the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerReport {
    pub environment: EnvironmentName,
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl ServerReport {
    pub fn found(environment: EnvironmentName) -> Self {
        Self {
            environment,
            found: true,
            locale: None,
        }
    }

    pub fn not_found(environment: EnvironmentName) -> Self {
        Self {
            environment,
            found: false,
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationInput {
    pub assumed: EnvironmentName,
    pub server: ServerReport,
}

impl NegotiationInput {
    pub fn new(assumed: EnvironmentName, server: ServerReport) -> Self {
        Self { assumed, server }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "environment", rename_all = "snake_case")]
pub enum NegotiationOutcome {
    Proceed,
    SkipPluginSync,
    RestartWithEnvironment(EnvironmentName),
}

impl NegotiationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegotiationOutcome::Proceed => "proceed",
            NegotiationOutcome::SkipPluginSync => "skip_plugin_sync",
            NegotiationOutcome::RestartWithEnvironment(_) => "restart_with_environment",
        }
    }

    /// Terminal state this outcome lands in.
    pub fn state(&self) -> NegotiationState {
        match self {
            NegotiationOutcome::Proceed => NegotiationState::Proceeding,
            NegotiationOutcome::SkipPluginSync => NegotiationState::SkippingSync,
            NegotiationOutcome::RestartWithEnvironment(_) => NegotiationState::Restarting,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationState {
    Initial,
    Proceeding,
    SkippingSync,
    Restarting,
}

impl NegotiationState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, NegotiationState::Initial)
    }
}

/// Outcome plus the diagnostic to show the operator, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Negotiation {
    #[serde(flatten)]
    pub outcome: NegotiationOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

/// Decide the next action for one agent pass.
///
/// 1. Server reports not found: skip pluginsync, keep the assumed environment.
/// 2. Server environment differs: restart with the server's environment.
/// 3. Otherwise: proceed.
pub fn negotiate(input: &NegotiationInput) -> Negotiation {
    let server = &input.server;
    let locale = server.locale.clone();

    let negotiation = if !server.found {
        Negotiation {
            outcome: NegotiationOutcome::SkipPluginSync,
            diagnostic: Some(Diagnostic::new(
                DiagnosticKey::EnvNotFoundSkipSync {
                    environment: input.assumed.clone(),
                },
                locale,
            )),
        }
    } else if server.environment != input.assumed {
        Negotiation {
            outcome: NegotiationOutcome::RestartWithEnvironment(server.environment.clone()),
            diagnostic: Some(Diagnostic::new(
                DiagnosticKey::EnvMismatchRestart {
                    local: input.assumed.clone(),
                    server: server.environment.clone(),
                },
                locale,
            )),
        }
    } else {
        Negotiation {
            outcome: NegotiationOutcome::Proceed,
            diagnostic: None,
        }
    };

    obs::emit_negotiated(
        input.assumed.as_str(),
        server.environment.as_str(),
        server.found,
        negotiation.outcome.as_str(),
    );
    negotiation
}

/// One negotiation per run: `Initial` moves to exactly one terminal state.
#[derive(Debug, Clone, Default)]
pub struct NegotiationStateMachine {
    decided: Option<Negotiation>,
}

impl NegotiationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NegotiationState {
        self.decided
            .as_ref()
            .map(|n| n.outcome.state())
            .unwrap_or(NegotiationState::Initial)
    }

    /// Evaluate the transition rule. Once a terminal state is reached, later
    /// calls return the recorded decision and ignore `input`.
    pub fn advance(&mut self, input: &NegotiationInput) -> &Negotiation {
        self.decided.get_or_insert_with(|| negotiate(input))
    }

    pub fn decision(&self) -> Option<&Negotiation> {
        self.decided.as_ref()
    }
}
