//! Data source formats and metadata.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScourError};

/// File formats scour reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// Delimited text; the delimiter is detected unless configured.
    Csv,
    /// Tab-separated text.
    Tsv,
    /// A JSON array of objects.
    Json,
}

impl DataFormat {
    /// Infer the format from a file extension.
    ///
    /// Files without an extension are treated as CSV.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = match path.extension() {
            Some(ext) => ext.to_string_lossy().to_ascii_lowercase(),
            None => return Ok(DataFormat::Csv),
        };
        match ext.as_str() {
            "csv" | "txt" | "psv" => Ok(DataFormat::Csv),
            "tsv" | "tab" => Ok(DataFormat::Tsv),
            "json" => Ok(DataFormat::Json),
            other => Err(ScourError::UnsupportedFormat(format!(
                "'.{}' files are not supported ({})",
                other,
                path.display()
            ))),
        }
    }

    /// Lowercase name.
    pub fn label(&self) -> &'static str {
        match self {
            DataFormat::Csv => "csv",
            DataFormat::Tsv => "tsv",
            DataFormat::Json => "json",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Metadata about the loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, csv-semicolon, psv, json).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns as read, before the ID column is added.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DataFormat::from_path("a.CSV").unwrap(), DataFormat::Csv);
        assert_eq!(DataFormat::from_path("a.tsv").unwrap(), DataFormat::Tsv);
        assert_eq!(DataFormat::from_path("a.json").unwrap(), DataFormat::Json);
        assert_eq!(DataFormat::from_path("noext").unwrap(), DataFormat::Csv);
        assert!(matches!(
            DataFormat::from_path("a.xlsx"),
            Err(ScourError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_metadata_file_name() {
        let meta = SourceMetadata::new(
            PathBuf::from("/tmp/people.csv"),
            "sha256:00".to_string(),
            10,
            "csv".to_string(),
            2,
            3,
        );
        assert_eq!(meta.file, "people.csv");
    }
}
