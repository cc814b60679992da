//! Default on-disk locations.
//!
//! All data lives under `~/.ndvi-retriever/`:
//! - `~/.ndvi-retriever/config.toml` - main configuration
//! - `~/.ndvi-retriever/artifacts/` - downloaded extraction results

use std::path::{Path, PathBuf};

/// Returns the ndvi-retriever home directory (`~/.ndvi-retriever/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ndvi-retriever")
}

/// Returns the default config file path (`~/.ndvi-retriever/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}

/// Returns the default artifact directory (`~/.ndvi-retriever/artifacts/`).
pub fn artifact_dir() -> PathBuf {
    home_dir().join("artifacts")
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
