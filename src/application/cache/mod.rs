//! Bounded caches for retrieval results.

mod artifact;
mod lru;
mod manifest;

pub use artifact::{Artifact, ArtifactCache};
pub use lru::LruCache;
pub use manifest::{is_plain_file_name, Manifest, ManifestEntry, MANIFEST_FILE};
