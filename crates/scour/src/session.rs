//! Session: one working table, its history and its current error map.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::binning::{BinningConfig, Histogram1D, Histogram2D, HybridBinningEngine};
use crate::detection::{
    ColumnErrorMap, DetectorDescriptor, DetectorRegistry, ErrorDetectionEngine, ErrorKind,
};
use crate::error::{Result, ScourError};
use crate::history::{
    TransformationHistory, TransformationInfo, TransformationRecord, WranglerOutput,
    WranglerRegistry,
};
use crate::input::{Parser, ParserConfig, SourceMetadata, write_table};
use crate::table::{Row, RowId, Table, Value};

/// Configuration for a cleaning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Parser configuration.
    pub parser: ParserConfig,
    /// Detectors to run, in merge order.
    pub detectors: Vec<DetectorDescriptor>,
    /// Binning configuration.
    pub binning: BinningConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            detectors: DetectorDescriptor::defaults(),
            binning: BinningConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ScourError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ScourError::Config(format!("Invalid config '{}': {}", path.display(), e))
        })
    }

    /// Set the parser configuration.
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Set the detector list.
    pub fn with_detectors(mut self, detectors: Vec<DetectorDescriptor>) -> Self {
        self.detectors = detectors;
        self
    }

    /// Set the binning configuration.
    pub fn with_binning(mut self, binning: BinningConfig) -> Self {
        self.binning = binning;
        self
    }
}

/// Summary of a session's current state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Source file name, if loaded from disk.
    pub file: Option<String>,
    /// Rows as loaded.
    pub original_rows: usize,
    /// Rows in the working table.
    pub current_rows: usize,
    /// Data columns (excluding the ID column).
    pub columns: usize,
    /// Cells with at least one tag.
    pub flagged_cells: usize,
    /// Columns with at least one tag.
    pub columns_with_errors: usize,
    /// Tag occurrences per kind.
    pub errors_by_kind: BTreeMap<ErrorKind, usize>,
    /// Entries in the provenance log.
    pub transformations: usize,
}

/// A cleaning session.
///
/// Every mutation (including undo and redo) re-runs detection. If detection
/// cannot resolve a detector, the error map is cleared and the error
/// returned, so callers never see a stale map.
#[derive(Debug)]
pub struct Session {
    history: TransformationHistory,
    detectors: DetectorRegistry,
    wranglers: WranglerRegistry,
    descriptors: Vec<DetectorDescriptor>,
    binning: HybridBinningEngine,
    error_map: ColumnErrorMap,
    source: Option<SourceMetadata>,
}

impl Session {
    /// Start a session on an in-memory table with the built-in plugins.
    pub fn new(table: Table, config: SessionConfig) -> Result<Self> {
        Self::with_registries(
            table,
            config,
            DetectorRegistry::with_defaults(),
            WranglerRegistry::with_defaults(),
        )
    }

    /// Start a session with custom plugin registries.
    pub fn with_registries(
        table: Table,
        config: SessionConfig,
        detectors: DetectorRegistry,
        wranglers: WranglerRegistry,
    ) -> Result<Self> {
        let mut session = Self {
            history: TransformationHistory::new(table),
            detectors,
            wranglers,
            descriptors: config.detectors,
            binning: HybridBinningEngine::new(config.binning),
            error_map: ColumnErrorMap::default(),
            source: None,
        };
        session.detect()?;
        Ok(session)
    }

    /// Load a file and start a session on it.
    pub fn open(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self> {
        let parser = Parser::with_config(config.parser.clone());
        let (table, source) = parser.parse_file(path)?;
        let mut session = Self::new(table, config)?;
        session.source = Some(source);
        Ok(session)
    }

    /// Replace the dataset, clearing history, log and selection.
    pub fn load(&mut self, table: Table, source: Option<SourceMetadata>) -> Result<()> {
        self.history.reset(table);
        self.source = source;
        self.detect()
    }

    fn detect(&mut self) -> Result<()> {
        match ErrorDetectionEngine::run_descriptors(
            self.history.table(),
            &self.detectors,
            &self.descriptors,
        ) {
            Ok(map) => {
                self.error_map = map;
                Ok(())
            }
            Err(e) => {
                warn!("Detection aborted, clearing error map: {}", e);
                self.error_map = ColumnErrorMap::default();
                Err(e)
            }
        }
    }

    /// The working table.
    pub fn table(&self) -> &Table {
        self.history.table()
    }

    /// The underlying history.
    pub fn history(&self) -> &TransformationHistory {
        &self.history
    }

    /// Error map for the working table.
    pub fn error_map(&self) -> &ColumnErrorMap {
        &self.error_map
    }

    /// The provenance log.
    pub fn log(&self) -> &[TransformationRecord] {
        self.history.log()
    }

    /// Metadata of the loaded file, if any.
    pub fn source(&self) -> Option<&SourceMetadata> {
        self.source.as_ref()
    }

    /// Detector list used for every pass.
    pub fn descriptors(&self) -> &[DetectorDescriptor] {
        &self.descriptors
    }

    /// Replace the detector list and re-detect.
    ///
    /// On a resolution failure the error map is left empty.
    pub fn set_detectors(&mut self, descriptors: Vec<DetectorDescriptor>) -> Result<()> {
        self.descriptors = descriptors;
        self.detect()
    }

    /// Set the operator's selection.
    pub fn select(&mut self, ids: Vec<RowId>) {
        self.history.set_selection(ids);
    }

    /// The operator's selection.
    pub fn selection(&self) -> &[RowId] {
        self.history.selection()
    }

    /// Select rows whose `column` value satisfies `predicate`.
    pub fn select_where<P>(&mut self, column: &str, mut predicate: P) -> Result<()>
    where
        P: FnMut(&Value) -> bool,
    {
        self.table().require_column(column)?;
        let ids = self
            .table()
            .column_values(column)
            .filter(|(_, value)| predicate(value))
            .map(|(id, _)| id)
            .collect();
        self.select(ids);
        Ok(())
    }

    /// Keep rows for which `predicate` holds, then re-detect.
    pub fn filter_rows<P>(&mut self, predicate: P, info: TransformationInfo) -> Result<()>
    where
        P: FnMut(&Row) -> Result<bool>,
    {
        self.history.filter_rows(predicate, info)?;
        self.detect()
    }

    /// Recompute `column` with `value_fn`, then re-detect.
    pub fn derive_column<F>(&mut self, column: &str, value_fn: F, info: TransformationInfo) -> Result<()>
    where
        F: FnMut(&Row) -> Result<Value>,
    {
        self.history.derive_column(column, value_fn, info)?;
        self.detect()
    }

    /// Apply a registered wrangler to the current selection.
    ///
    /// `x_column` is the wrangler's target; `y_column` is recorded when the
    /// selection came from a 2D view. The selection is cleared on success.
    pub fn apply_wrangler(&mut self, code: &str, x_column: &str, y_column: Option<&str>) -> Result<()> {
        let wrangler = self.wranglers.resolve(code)?;
        self.table().require_column(x_column)?;
        if let Some(y) = y_column {
            self.table().require_column(y)?;
        }

        let selection = self.history.selection().to_vec();
        let info = TransformationInfo::from_selection(
            self.table(),
            &selection,
            x_column,
            y_column,
            &self.error_map,
        );

        info!(
            "Applying '{}' to {} selected row(s) on '{}'",
            wrangler.name(),
            info.affected_ids.len(),
            x_column
        );

        match wrangler.wrangle(x_column, self.table(), &selection)? {
            WranglerOutput::Filter { predicate } => self.history.filter_rows(predicate, info)?,
            WranglerOutput::Derive {
                value_fn,
                imputed_value,
            } => {
                let info = info.with_imputation(x_column, imputed_value);
                self.history.derive_column(x_column, value_fn, info)?
            }
        }

        self.history.set_selection(Vec::new());
        self.detect()
    }

    /// Undo one mutation and re-detect. Returns whether anything changed.
    pub fn undo(&mut self) -> Result<bool> {
        let moved = self.history.undo();
        self.detect()?;
        Ok(moved)
    }

    /// Redo one mutation and re-detect. Returns whether anything changed.
    pub fn redo(&mut self) -> Result<bool> {
        let moved = self.history.redo();
        self.detect()?;
        Ok(moved)
    }

    /// 1D histogram of a column in the working table.
    pub fn histogram(&self, column: &str) -> Result<Histogram1D> {
        self.binning
            .histogram_1d(self.table(), &self.error_map, column)
    }

    /// 2D grid over a column pair in the working table.
    pub fn grid(&self, x_column: &str, y_column: &str) -> Result<Histogram2D> {
        self.binning
            .histogram_2d(self.table(), &self.error_map, x_column, y_column)
    }

    fn source_filename(&self) -> String {
        self.source
            .as_ref()
            .map(|s| s.file.clone())
            .unwrap_or_else(|| "data.csv".to_string())
    }

    /// Script replaying the provenance log against the source file.
    pub fn export_script(&self) -> String {
        self.history.export_script(&self.source_filename())
    }

    /// Write the replay script.
    pub fn save_script(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.export_script()).map_err(|e| {
            ScourError::Persistence(format!("Failed to write script '{}': {}", path.display(), e))
        })?;
        info!("Script saved: {}", path.display());
        Ok(())
    }

    /// Write the working table; the format follows the extension.
    pub fn save_cleaned(&self, path: impl AsRef<Path>) -> Result<()> {
        write_table(self.table(), path)
    }

    /// Write the provenance log as JSON.
    pub fn save_log(&self, path: impl AsRef<Path>) -> Result<()> {
        self.history.save_log(path)
    }

    /// Summarize the current state.
    pub fn summary(&self) -> SessionSummary {
        let errors_by_kind = ErrorKind::ALL
            .iter()
            .map(|&kind| (kind, self.error_map.count(kind)))
            .filter(|(_, count)| *count > 0)
            .collect();

        SessionSummary {
            file: self.source.as_ref().map(|s| s.file.clone()),
            original_rows: self.history.original_row_count(),
            current_rows: self.table().row_count(),
            columns: self.table().data_columns().count(),
            flagged_cells: self.error_map.flagged_cells(),
            columns_with_errors: self.error_map.columns().count(),
            errors_by_kind,
            transformations: self.history.log().len(),
        }
    }
}
