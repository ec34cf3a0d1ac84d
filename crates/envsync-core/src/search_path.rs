//! Ordered list of environment root directories (`environmentpath`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// OS path-list separator used to split and render search paths.
pub const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Ordered roots searched for a named environment. First match wins.
///
/// Construction does not validate; [`SearchPath::validate`] is checked by the
/// resolver so an empty or relative path surfaces as a configuration error
/// instead of looking like a missing environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchPath {
    roots: Vec<PathBuf>,
    /// `environmentpath` as written, when parsed from a string
    #[serde(skip)]
    configured: Option<String>,
}

impl SearchPath {
    pub fn from_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            configured: None,
        }
    }

    /// Split an `environmentpath` string on the OS separator. Empty segments
    /// are dropped from the roots; `Display` still shows `raw` unchanged.
    pub fn parse(raw: &str) -> Self {
        let roots = std::env::split_paths(raw)
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self {
            roots,
            configured: Some(raw.to_string()),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Every root, in order, joined with [`PATH_LIST_SEPARATOR`].
    pub fn joined(&self) -> String {
        let sep = PATH_LIST_SEPARATOR.to_string();
        self.roots
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(&sep)
    }

    /// Reasons this path cannot be searched, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.roots.is_empty() {
            return Err("environmentpath is empty".to_string());
        }
        if let Some(relative) = self.roots.iter().find(|p| !p.is_absolute()) {
            return Err(format!(
                "environmentpath entry '{}' is not an absolute path",
                relative.display()
            ));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(PathBuf::as_path)
    }
}

/// The configured string for parsed paths, otherwise [`SearchPath::joined`].
impl std::fmt::Display for SearchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.configured {
            Some(raw) => f.write_str(raw),
            None => f.write_str(&self.joined()),
        }
    }
}
