//! Binary snapshot persistence over `bincode`.
//!
//! Training-support state (processed datasets, intermediate results) is
//! written as a compact binary blob. Loading is deliberately forgiving:
//! a missing or unreadable snapshot means "start fresh", not "abort the
//! run".

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to encode state: {source}")]
    Encode {
        #[from]
        source: bincode::Error,
    },
}

/// Serializes `value` with `bincode` and writes it to `path`.
///
/// # Errors
///
/// Returns [`PersistError::Encode`] when serialization fails and
/// [`PersistError::Io`] when the file cannot be written.
pub fn save_state<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistError> {
    let data = bincode::serialize(value)?;
    fs::write(path, &data).map_err(|source| PersistError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    })?;
    info!(
        path = %path.display(),
        bytes = data.len(),
        "Saved state snapshot."
    );
    Ok(())
}

/// Reads a snapshot written by [`save_state`].
///
/// Any failure, from a missing file to a stale or truncated blob, logs
/// a diagnostic and yields `None` so callers fall back to recomputing
/// the state.
pub fn load_state<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No state snapshot found.");
            return None;
        }
        Err(source) => {
            warn!(
                path = %path.display(),
                error = %source,
                "Could not read state snapshot; starting fresh."
            );
            return None;
        }
    };
    match bincode::deserialize(&data) {
        Ok(value) => {
            info!(
                path = %path.display(),
                bytes = data.len(),
                "Loaded state snapshot."
            );
            Some(value)
        }
        Err(source) => {
            warn!(
                path = %path.display(),
                error = %source,
                "Could not decode state snapshot; starting fresh."
            );
            None
        }
    }
}
