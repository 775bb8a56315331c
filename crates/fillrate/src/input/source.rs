//! Metadata about the data file being checked.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Metadata about the source data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of header columns.
    pub column_count: usize,
}

impl SourceMetadata {
    pub fn new(path: PathBuf, size_bytes: u64, format: String, column_count: usize) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            size_bytes,
            format,
            column_count,
        }
    }
}
