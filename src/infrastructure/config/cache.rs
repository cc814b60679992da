//! Artifact cache settings.

use std::path::PathBuf;

use serde::Deserialize;

use crate::infrastructure::paths;

/// `[cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Number of artifacts kept on disk.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Artifact directory. A leading `~/` is expanded.
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

const fn default_capacity() -> usize {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            directory: None,
        }
    }
}

impl CacheConfig {
    /// Directory artifacts are written to.
    #[must_use]
    pub fn artifact_dir(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => paths::expand_home(dir),
            None => paths::artifact_dir(),
        }
    }
}
