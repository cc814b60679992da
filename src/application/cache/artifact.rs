//! Bounded cache of downloaded artifacts on disk.
//!
//! Each cached query owns one CSV file. Files are reference-counted through
//! [`Artifact`] handles: evicting an entry drops the cache's handle, and the
//! file is deleted when the last handle goes away. A reader that obtained a
//! handle before the eviction keeps the file alive until it is done.
//!
//! A cache created with [`ArtifactCache::open`] keeps its index in a
//! [`Manifest`] so entries survive the process. Files still cached when the
//! cache is dropped stay on disk for the next run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::lru::LruCache;
use super::manifest::{is_plain_file_name, Manifest, ManifestEntry};
use crate::domain::CacheKey;
use crate::error::Result;

/// Extension of interrupted downloads, always safe to remove.
const PARTIAL_EXTENSION: &str = "part";

/// A downloaded file whose lifetime is tied to its handles.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    retain: AtomicBool,
}

impl Artifact {
    /// Take ownership of the file at `path`.
    #[must_use]
    pub fn adopt(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            retain: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the file on disk when this handle is dropped.
    fn disown(&self) {
        self.retain.store(true, Ordering::Release);
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if self.retain.load(Ordering::Acquire) {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed artifact"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Artifact already removed");
            }
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove artifact"),
        }
    }
}

/// Thread-safe, fixed-capacity cache of query artifacts.
pub struct ArtifactCache {
    dir: PathBuf,
    persistent: bool,
    entries: Mutex<LruCache<CacheKey, Arc<Artifact>>>,
}

impl ArtifactCache {
    /// Create an in-memory cache over `dir` without touching the filesystem.
    ///
    /// Nothing is persisted; cached files are deleted with the cache.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            dir: dir.into(),
            persistent: false,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Open the persistent cache in `dir`, creating the directory if needed.
    ///
    /// Entries listed in the manifest are restored in recency order. Entries
    /// whose file is gone are dropped, and entries beyond `capacity` are
    /// evicted (their files deleted). Interrupted `*.part` downloads are
    /// removed. Other files in the directory are never touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or listed.
    #[allow(clippy::result_large_err)]
    pub fn open(dir: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        let mut cache = Self::new(dir, capacity);
        cache.persistent = true;
        fs::create_dir_all(&cache.dir)?;

        let swept = cache.sweep_partials()?;
        if swept > 0 {
            info!(dir = %cache.dir.display(), swept, "Removed interrupted downloads");
        }

        let restored = cache.restore(Manifest::load(&cache.dir));
        if restored > 0 {
            info!(dir = %cache.dir.display(), restored, "Restored cached artifacts");
        }
        Ok(cache)
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.lock().capacity()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys from least- to most-recently-used.
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        self.entries.lock().keys_by_recency().cloned().collect()
    }

    /// Look up an artifact, promoting it to most-recently-used.
    ///
    /// The returned handle keeps the file alive even if the entry is evicted
    /// while the caller reads it.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Artifact>> {
        let mut entries = self.entries.lock();
        let artifact = entries.get(key).cloned()?;
        self.persist(&entries);
        Some(artifact)
    }

    /// Insert an artifact for `key`.
    ///
    /// Returns the path of the displaced artifact (superseded value for the
    /// same key, or the evicted least-recently-used entry). Its file is
    /// deleted once no reader holds it.
    pub fn insert(&self, key: CacheKey, artifact: Arc<Artifact>) -> Option<PathBuf> {
        let new_path = artifact.path().to_path_buf();
        let displaced = {
            let mut entries = self.entries.lock();
            let displaced = entries.put(key.clone(), artifact);
            self.persist(&entries);
            displaced?
        };

        if displaced.path() == new_path {
            // Same file re-inserted for the same key; nothing to reclaim.
            displaced.disown();
            return None;
        }

        debug!(
            key = %key,
            displaced = %displaced.path().display(),
            "Artifact displaced from cache"
        );
        Some(displaced.path().to_path_buf())
    }

    /// Drop the entry for `key`, deleting its file once unreferenced.
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        let mut entries = self.entries.lock();
        let removed = entries.remove(key).is_some();
        if removed {
            self.persist(&entries);
        }
        removed
    }

    /// Rewrite the manifest from `entries`. Called with the lock held so
    /// concurrent updates land in order.
    fn persist(&self, entries: &LruCache<CacheKey, Arc<Artifact>>) {
        if !self.persistent {
            return;
        }
        let manifest = Manifest {
            entries: entries
                .iter_by_recency()
                .filter_map(|(key, artifact)| {
                    let file = artifact.path().file_name()?.to_str()?.to_string();
                    Some(ManifestEntry {
                        key: key.clone(),
                        file,
                    })
                })
                .collect(),
            ..Manifest::default()
        };
        if let Err(e) = manifest.save(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "Failed to write cache manifest");
        }
    }

    fn restore(&self, manifest: Manifest) -> usize {
        let mut entries = self.entries.lock();
        for entry in manifest.entries {
            if !is_plain_file_name(&entry.file) {
                warn!(file = %entry.file, "Ignoring manifest entry outside the cache directory");
                continue;
            }
            let path = self.dir.join(&entry.file);
            if !path.is_file() {
                debug!(key = %entry.key, path = %path.display(), "Cached artifact missing, dropping entry");
                continue;
            }
            if let Some(evicted) = entries.put(entry.key, Artifact::adopt(path)) {
                debug!(path = %evicted.path().display(), "Evicted artifact over capacity");
            }
        }
        self.persist(&entries);
        entries.len()
    }

    fn sweep_partials(&self) -> Result<usize> {
        let mut swept = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let partial = path
                .extension()
                .is_some_and(|e| e == PARTIAL_EXTENSION);
            if !partial || !path.is_file() {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => swept += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove partial download"),
            }
        }
        Ok(swept)
    }
}

impl Drop for ArtifactCache {
    fn drop(&mut self) {
        if !self.persistent {
            return;
        }
        // Cached files belong to the manifest now, not to this process.
        for (_, artifact) in self.entries.lock().iter_by_recency() {
            artifact.disown();
        }
    }
}
