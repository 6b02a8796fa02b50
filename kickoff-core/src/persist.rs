//! JSON persistence helpers
//!
//! Every stateful type in the workspace derives serde, so saving is a thin
//! wrapper that attaches the path to whatever went wrong.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KickoffError, Result};

/// Load any deserializable value from a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| KickoffError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| KickoffError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a value as pretty-printed JSON
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|source| KickoffError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    std::fs::write(path, content).map_err(|source| KickoffError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Saved {}", path.display());
    Ok(())
}
