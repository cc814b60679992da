//! On-disk index of cached artifacts.
//!
//! The manifest lives next to the artifacts as `index.json` and lists every
//! cached key with its file, from least- to most-recently-used. It is
//! rewritten after each change so a later process can pick the cache up
//! where this one left off.

use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::CacheKey;
use crate::error::Result;

/// File name of the manifest inside the artifact directory.
pub const MANIFEST_FILE: &str = "index.json";

/// Current manifest format version.
const MANIFEST_VERSION: u32 = 1;

/// Persisted cache index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    /// Least-recently-used first.
    pub entries: Vec<ManifestEntry>,
}

/// One cached key and the artifact file it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub key: CacheKey,
    /// File name relative to the artifact directory.
    pub file: String,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: Vec::new(),
        }
    }
}

impl Manifest {
    #[must_use]
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(MANIFEST_FILE)
    }

    /// Read the manifest in `dir`.
    ///
    /// A missing file is an empty cache. An unreadable or unknown-version
    /// manifest is logged and also treated as empty; the files it listed
    /// are left alone.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        let path = Self::path(dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cache manifest");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&content) {
            Ok(manifest) if manifest.version == MANIFEST_VERSION => manifest,
            Ok(manifest) => {
                warn!(
                    path = %path.display(),
                    version = manifest.version,
                    "Unsupported cache manifest version, starting empty"
                );
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt cache manifest, starting empty");
                Self::default()
            }
        }
    }

    /// Write the manifest atomically (temp file, then rename).
    #[allow(clippy::result_large_err)]
    pub fn save(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let path = Self::path(dir);
        let temp_path = path.with_extension("tmp");

        let cleanup_and_err = |e| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &path).map_err(cleanup_and_err)?;
        Ok(())
    }
}

/// Whether `name` is a single plain path component (no separators, no `..`).
#[must_use]
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
}
