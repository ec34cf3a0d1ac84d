//! Master-side directory environment resolution.
//!
//! Maps an [`EnvironmentName`] and a [`SearchPath`] to the first root that
//! holds a readable directory of that name. Stateless and uncached; callers
//! that want caching layer it on top.

use crate::error::{ResolutionFailure, ResolveError};
use crate::obs;
use crate::search_path::SearchPath;
use envsync_classifier::EnvironmentName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An environment located on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEnvironment {
    pub name: EnvironmentName,
    pub path: PathBuf,
    /// `manifests/` exists under `path`
    pub manifests: bool,
    /// `modules/` exists under `path`
    pub modules: bool,
}

/// Stateless resolver. Safe to share across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvironmentResolver;

impl EnvironmentResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(
        &self,
        name: &EnvironmentName,
        search_path: &SearchPath,
    ) -> Result<ResolvedEnvironment, ResolveError> {
        resolve(name, search_path)
    }
}

/// Resolve `name` against `search_path`.
///
/// Roots are tried in order and the first readable directory wins. When none
/// matches, the failure carries the whole search path.
pub fn resolve(
    name: &EnvironmentName,
    search_path: &SearchPath,
) -> Result<ResolvedEnvironment, ResolveError> {
    if let Err(reason) = search_path.validate() {
        obs::emit_degenerate_config(&reason);
        return Err(ResolveError::DegenerateConfig(reason));
    }

    for root in search_path.iter() {
        let candidate = root.join(name.as_str());
        debug!(root = %root.display(), candidate = %candidate.display(), "probing environment root");

        if is_environment_dir(&candidate) {
            obs::emit_environment_resolved(name.as_str(), &candidate);
            return Ok(ResolvedEnvironment {
                name: name.clone(),
                manifests: candidate.join("manifests").is_dir(),
                modules: candidate.join("modules").is_dir(),
                path: candidate,
            });
        }
    }

    obs::emit_environment_not_found(name.as_str(), &search_path.to_string());
    Err(ResolutionFailure {
        name: name.clone(),
        search_path: search_path.clone(),
    }
    .into())
}

/// Exists, is a directory, and can be listed.
fn is_environment_dir(path: &Path) -> bool {
    path.is_dir() && std::fs::read_dir(path).is_ok()
}
