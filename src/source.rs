//! Dataset Source Module
//!
//! The seam between the cache and wherever records actually live. The
//! orchestrator only sees the [`DatasetSource`] trait; the file-backed
//! implementation below is what the server wires in.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Fetches the full record set for one dataset.
///
/// A source is called on every cache miss. Concurrent misses for the same
/// dataset are not de-duplicated, so implementations must tolerate
/// overlapping calls.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Value>>;
}

/// Reads a dataset from a JSON file.
///
/// The document may be a top-level array of records or an object carrying
/// the records under a `data` key.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }

    /// Builds the source for a named dataset under `data_dir`. Names are
    /// restricted to `[A-Za-z0-9_-]` so a request can never address a file
    /// outside the data directory.
    pub fn for_dataset(data_dir: &Path, name: &str) -> Result<Self> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Source(format!("invalid dataset name '{}'", name)));
        }
        Ok(FileSource::new(data_dir.join(format!("{}.json", name))))
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self) -> Result<Vec<Value>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| Error::Source(format!("{}: {}", self.path.display(), e)))?;
        let parsed: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::Source(format!("{}: {}", self.path.display(), e)))?;

        let records = match parsed {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Array(records)) => records,
                _ => {
                    return Err(Error::Source(format!(
                        "{}: expected an array of records",
                        self.path.display()
                    )));
                }
            },
            _ => {
                return Err(Error::Source(format!(
                    "{}: expected an array of records",
                    self.path.display()
                )));
            }
        };

        debug!(path = %self.path.display(), records = records.len(), "loaded dataset");
        Ok(records)
    }
}

/// Lists the dataset names available under `data_dir`, sorted.
pub async fn list_datasets(data_dir: &Path) -> Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(data_dir)
        .await
        .map_err(|e| Error::Source(format!("{}: {}", data_dir.display(), e)))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::Source(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
