//! Agent diagnostics as message keys plus parameters.
//!
//! Rendering to human text is done by a [`Localizer`], so negotiation
//! outcomes never depend on display language.

use envsync_classifier::EnvironmentName;
use serde::{Deserialize, Serialize};

/// Message key with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKey {
    /// Server has no such environment; initial pluginsync is skipped.
    EnvNotFoundSkipSync { environment: EnvironmentName },
    /// Server assigned a different environment; the run restarts with it.
    EnvMismatchRestart {
        local: EnvironmentName,
        server: EnvironmentName,
    },
}

impl DiagnosticKey {
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKey::EnvNotFoundSkipSync { .. } => "ENV_NOT_FOUND_SKIP_SYNC",
            DiagnosticKey::EnvMismatchRestart { .. } => "ENV_MISMATCH_RESTART",
        }
    }
}

/// A diagnostic plus the locale the server asked for, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(flatten)]
    pub key: DiagnosticKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl Diagnostic {
    pub fn new(key: DiagnosticKey, locale: Option<String>) -> Self {
        Self { key, locale }
    }

    pub fn code(&self) -> &'static str {
        self.key.code()
    }
}

/// Renders diagnostics for display.
pub trait Localizer: Send + Sync {
    fn render(&self, diagnostic: &Diagnostic) -> String;
}

/// Built-in English catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn render(&self, diagnostic: &Diagnostic) -> String {
        match &diagnostic.key {
            DiagnosticKey::EnvNotFoundSkipSync { environment } => format!(
                "Environment '{}' not found on server, skipping initial pluginsync.",
                environment
            ),
            DiagnosticKey::EnvMismatchRestart { local, server } => format!(
                "Local environment: '{}' doesn't match server specified environment '{}', restarting agent run with environment '{}'",
                local, server, server
            ),
        }
    }
}
