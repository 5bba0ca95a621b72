//! Persistence for provenance logs - save/load JSON files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Result, ScourError};

use super::history::TransformationHistory;
use super::record::TransformationRecord;

/// Default log path for a data file: `data.csv` → `data.provenance.json`.
pub fn provenance_path(data_path: impl AsRef<Path>) -> PathBuf {
    let data_path = data_path.as_ref();
    let stem = data_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    data_path.with_file_name(format!("{}.provenance.json", stem))
}

impl TransformationHistory {
    /// Save the provenance log to a JSON file.
    pub fn save_log(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    ScourError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            ScourError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
        })?;

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self.log()).map_err(|e| {
            ScourError::Persistence(format!("Failed to serialize provenance log: {}", e))
        })?;

        info!("Provenance log saved: {}", path.display());
        Ok(())
    }

    /// Load a provenance log from a JSON file.
    pub fn load_log(path: impl AsRef<Path>) -> Result<Vec<TransformationRecord>> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            ScourError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| {
            ScourError::Persistence(format!(
                "Failed to parse provenance log '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TransformationInfo;
    use crate::table::{Value, ingest};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_log() {
        let table = ingest(
            vec!["x".to_string()],
            vec![vec![Value::Number(1.0)], vec!["bad".into()]],
        );
        let mut history = TransformationHistory::new(table);
        let info = TransformationInfo {
            affected_ids: vec![2],
            x_column: "x".to_string(),
            x_values: vec!["bad".into()],
            ..TransformationInfo::default()
        };
        history.filter_rows(|row| Ok(row.id() != 2), info).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("log.json");
        history.save_log(&path).unwrap();

        let loaded = TransformationHistory::load_log(&path).unwrap();
        assert_eq!(loaded, history.log());
    }

    #[test]
    fn test_load_missing_file() {
        let result = TransformationHistory::load_log("/nonexistent/log.json");
        assert!(matches!(result, Err(ScourError::Persistence(_))));
    }

    #[test]
    fn test_provenance_path() {
        assert_eq!(
            provenance_path("/data/people.csv"),
            PathBuf::from("/data/people.provenance.json")
        );
    }
}
