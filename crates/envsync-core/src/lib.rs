//! envsync Core Library
//!
//! Environment resolution on the master, the agent's environment negotiation,
//! and the in-memory response buffer that carries results between them.
//!
//! ## Components
//!
//! - [`resolver`]: maps an environment name and `environmentpath` to a directory
//! - [`response`]: status, content type, and an ordered body accumulated in memory
//! - [`negotiation`]: decides proceed / skip pluginsync / restart for an agent pass
//! - [`agent`]: drives passes until the environment settles
//! - [`master`]: in-process master built on the resolver and classifier gateway

pub mod agent;
pub mod diagnostics;
pub mod error;
pub mod master;
pub mod negotiation;
pub mod obs;
pub mod resolver;
pub mod response;
pub mod search_path;
pub mod settings;
pub mod telemetry;

pub use agent::{AgentRunner, MasterConnection, RunReport, MAX_ENVIRONMENT_FETCHES};
pub use diagnostics::{Diagnostic, DiagnosticKey, EnglishLocalizer, Localizer};
pub use error::{AgentError, ResolutionFailure, ResolveError, Result, SettingsError};
pub use master::{respond_environment, LocalMaster};
pub use negotiation::{
    negotiate, Negotiation, NegotiationInput, NegotiationOutcome, NegotiationState,
    NegotiationStateMachine, ServerReport,
};
pub use resolver::{resolve, EnvironmentResolver, ResolvedEnvironment};
pub use response::{ResponseBuffer, CONTENT_TYPE_JSON, CONTENT_TYPE_TEXT};
pub use search_path::{SearchPath, PATH_LIST_SEPARATOR};
pub use settings::Settings;
pub use telemetry::{init_tracing, LogFormat};

pub use envsync_classifier::{
    Classification, Classifier, ClassifierError, ClassifierGateway, EnvironmentName,
    HttpClassifier, HttpClassifierConfig, NodeId, StaticClassifier,
};
