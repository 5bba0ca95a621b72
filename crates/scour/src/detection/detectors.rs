//! Built-in detectors.
//!
//! Every detector is a pure function of the table. Degenerate input (empty
//! columns, too few samples, zero spread) yields no tags rather than an error.

use indexmap::IndexMap;
use tracing::debug;

use crate::table::{RowId, Table, Value, ValueKind};

use super::kind::{ErrorKind, PartialColumnErrorMap};

/// Minimum number of numeric samples before anomalies are considered.
pub const MIN_ANOMALY_SAMPLES: usize = 10;

/// Distance from the mean, in sample standard deviations, that counts as an anomaly.
pub const ANOMALY_STDDEV_FACTOR: f64 = 2.0;

/// Categories seen fewer times than this are tagged incomplete.
pub const MIN_CATEGORY_COUNT: usize = 3;

/// A data-quality detector.
pub trait Detector: Send + Sync {
    /// Stable name used in logs and registries.
    fn name(&self) -> &str;

    /// Scan the table and tag suspicious cells, one kind per cell.
    fn detect(&self, table: &Table) -> PartialColumnErrorMap;
}

fn insert(map: &mut PartialColumnErrorMap, column: &str, id: RowId, kind: ErrorKind) {
    map.entry(column.to_string()).or_default().insert(id, kind);
}

/// Flags null, blank, and "null"/"undefined" placeholder values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MissingValueDetector;

impl MissingValueDetector {
    /// Whether a value counts as missing.
    pub fn is_missing(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Text(s) => {
                let trimmed = s.trim();
                trimmed.is_empty()
                    || trimmed.eq_ignore_ascii_case("null")
                    || trimmed.eq_ignore_ascii_case("undefined")
            }
            _ => false,
        }
    }
}

impl Detector for MissingValueDetector {
    fn name(&self) -> &str {
        "missing_value"
    }

    fn detect(&self, table: &Table) -> PartialColumnErrorMap {
        let mut map = PartialColumnErrorMap::new();
        for column in table.data_columns() {
            for (id, value) in table.column_values(column) {
                if Self::is_missing(value) {
                    insert(&mut map, column, id, ErrorKind::Missing);
                }
            }
        }
        map
    }
}

/// Flags values whose kind differs from the column's most frequent kind.
///
/// Unlike the other detectors this one also scans the `ID` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTypeMismatchDetector;

impl DataTypeMismatchDetector {
    /// Most frequent kind in a column; ties go to the kind seen first.
    fn majority_kind(table: &Table, column: &str) -> Option<ValueKind> {
        let mut counts: IndexMap<ValueKind, usize> = IndexMap::new();
        for (_, value) in table.column_values(column) {
            *counts.entry(value.kind()).or_insert(0) += 1;
        }

        let mut best: Option<(ValueKind, usize)> = None;
        for (kind, count) in counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((kind, count)),
            }
        }
        best.map(|(kind, _)| kind)
    }
}

impl Detector for DataTypeMismatchDetector {
    fn name(&self) -> &str {
        "data_type_mismatch"
    }

    fn detect(&self, table: &Table) -> PartialColumnErrorMap {
        let mut map = PartialColumnErrorMap::new();
        for column in table.columns() {
            let Some(majority) = Self::majority_kind(table, column) else {
                continue;
            };
            for (id, value) in table.column_values(column) {
                if value.kind() != majority {
                    insert(&mut map, column, id, ErrorKind::Mismatch);
                }
            }
        }
        map
    }
}

/// Flags numeric values far from the column mean.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyDetector {
    min_samples: usize,
    stddev_factor: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self {
            min_samples: MIN_ANOMALY_SAMPLES,
            stddev_factor: ANOMALY_STDDEV_FACTOR,
        }
    }
}

impl AnomalyDetector {
    /// Create a detector with custom thresholds.
    pub fn new(min_samples: usize, stddev_factor: f64) -> Self {
        Self {
            min_samples,
            stddev_factor,
        }
    }

    /// Mean and sample standard deviation.
    fn mean_and_stddev(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        (mean, variance.sqrt())
    }
}

impl Detector for AnomalyDetector {
    fn name(&self) -> &str {
        "anomaly"
    }

    fn detect(&self, table: &Table) -> PartialColumnErrorMap {
        let mut map = PartialColumnErrorMap::new();
        for column in table.data_columns() {
            let numeric: Vec<(RowId, f64)> = table
                .column_values(column)
                .filter_map(|(id, value)| value.as_number().map(|n| (id, n)))
                .collect();

            if numeric.len() < self.min_samples.max(2) {
                continue;
            }

            let values: Vec<f64> = numeric.iter().map(|(_, n)| *n).collect();
            let (mean, stddev) = Self::mean_and_stddev(&values);
            if !stddev.is_finite() || stddev == 0.0 {
                continue;
            }

            let threshold = self.stddev_factor * stddev;
            for (id, n) in numeric {
                if (n - mean).abs() > threshold {
                    insert(&mut map, column, id, ErrorKind::Anomaly);
                }
            }
        }
        map
    }
}

/// Flags rare categorical values.
#[derive(Debug, Clone, Copy)]
pub struct IncompleteDetector {
    min_count: usize,
}

impl Default for IncompleteDetector {
    fn default() -> Self {
        Self {
            min_count: MIN_CATEGORY_COUNT,
        }
    }
}

impl IncompleteDetector {
    /// Create a detector with a custom minimum category count.
    pub fn new(min_count: usize) -> Self {
        Self { min_count }
    }
}

impl Detector for IncompleteDetector {
    fn name(&self) -> &str {
        "incomplete"
    }

    fn detect(&self, table: &Table) -> PartialColumnErrorMap {
        let mut map = PartialColumnErrorMap::new();
        for column in table.data_columns() {
            let mut groups: IndexMap<String, Vec<RowId>> = IndexMap::new();
            for (id, value) in table.column_values(column) {
                if value.is_numeric() || value.is_null_like() {
                    continue;
                }
                let label = value.category_label();
                if label.is_empty() {
                    continue;
                }
                groups.entry(label).or_default().push(id);
            }

            for (label, ids) in groups {
                if ids.len() < self.min_count {
                    debug!("Rare value '{}' in '{}' ({} rows)", label, column, ids.len());
                    for id in ids {
                        insert(&mut map, column, id, ErrorKind::Incomplete);
                    }
                }
            }
        }
        map
    }
}
