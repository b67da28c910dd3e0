//! Append-only training-history log in JSON-lines form.
//!
//! Each appended record becomes one JSON object per line, so a run can
//! be resumed or re-evaluated without rewriting earlier epochs.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to serialize history record: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

/// Writes records to a JSON-lines file, one line per call.
///
/// The file is created on first append and never truncated.
#[derive(Debug, Clone)]
pub struct HistoryWriter {
    path: PathBuf,
}

impl HistoryWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes the record and appends it as a single line.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Serialize`] when the record cannot be
    /// encoded and [`HistoryError::Io`] when the file cannot be opened
    /// or written.
    pub fn append<T: Serialize>(&self, record: &T) -> Result<(), HistoryError> {
        let line = serde_json::to_string(record)?;
        append_text(&self.path, &line)
    }
}

/// Appends `text` plus a trailing newline to the file at `path`.
pub(crate) fn append_text(path: &Path, text: &str) -> Result<(), HistoryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| HistoryError::Io {
            path: path.to_string_lossy().to_string(),
            source,
        })?;
    writeln!(file, "{}", text).map_err(|source| HistoryError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::tempdir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Row {
        epoch: u32,
        value: f64,
    }

    #[test]
    fn append_writes_one_json_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        let writer = HistoryWriter::new(&path);

        writer.append(&Row { epoch: 1, value: 0.5 }).unwrap();
        writer.append(&Row { epoch: 2, value: 0.75 }).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let rows: Vec<Row> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            rows,
            vec![
                Row { epoch: 1, value: 0.5 },
                Row { epoch: 2, value: 0.75 }
            ]
        );
    }

    #[test]
    fn append_preserves_existing_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.jsonl");
        fs::write(&path, "{\"epoch\":0,\"value\":0.1}\n").unwrap();

        let writer = HistoryWriter::new(&path);
        writer.append(&Row { epoch: 1, value: 0.2 }).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("{\"epoch\":0"));
    }

    #[test]
    fn append_fails_when_the_directory_is_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("history.jsonl");
        let writer = HistoryWriter::new(&path);

        let result = writer.append(&Row { epoch: 1, value: 0.5 });
        assert!(matches!(result, Err(HistoryError::Io { .. })));
    }
}
