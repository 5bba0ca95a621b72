//! Error kinds and the per-column, per-row error maps.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::table::RowId;

/// Data-quality tag attached to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Null, blank, or a "null"/"undefined" placeholder.
    Missing,
    /// Value kind differs from the column's majority kind.
    Mismatch,
    /// Numeric value more than two standard deviations from the mean.
    Anomaly,
    /// Rare categorical value (likely a truncated or mistyped entry).
    Incomplete,
}

impl ErrorKind {
    /// All kinds, in tag order.
    pub const ALL: [ErrorKind; 4] = [
        ErrorKind::Missing,
        ErrorKind::Mismatch,
        ErrorKind::Anomaly,
        ErrorKind::Incomplete,
    ];

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Missing => "missing",
            ErrorKind::Mismatch => "mismatch",
            ErrorKind::Anomaly => "anomaly",
            ErrorKind::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of a single detector: column → row → one kind.
pub type PartialColumnErrorMap = IndexMap<String, IndexMap<RowId, ErrorKind>>;

/// Merged detection result: column → row → ordered kinds.
///
/// Built once per detection pass by the engine and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnErrorMap {
    columns: IndexMap<String, IndexMap<RowId, Vec<ErrorKind>>>,
}

impl ColumnErrorMap {
    /// Merge partial maps in order, appending kinds per cell.
    pub(crate) fn merge<I>(partials: I) -> Self
    where
        I: IntoIterator<Item = PartialColumnErrorMap>,
    {
        let mut columns: IndexMap<String, IndexMap<RowId, Vec<ErrorKind>>> = IndexMap::new();
        for partial in partials {
            for (column, rows) in partial {
                let entry = columns.entry(column).or_default();
                for (id, kind) in rows {
                    entry.entry(id).or_default().push(kind);
                }
            }
        }
        Self { columns }
    }

    /// Row → kinds for one column.
    pub fn column(&self, column: &str) -> Option<&IndexMap<RowId, Vec<ErrorKind>>> {
        self.columns.get(column)
    }

    /// Kinds for one cell; empty when the cell is clean.
    pub fn kinds(&self, column: &str, id: RowId) -> &[ErrorKind] {
        self.columns
            .get(column)
            .and_then(|rows| rows.get(&id))
            .map(|kinds| kinds.as_slice())
            .unwrap_or(&[])
    }

    /// Columns with at least one flagged cell, in first-flagged order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|c| c.as_str())
    }

    /// Total occurrences of a kind across all cells.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.columns
            .values()
            .flat_map(|rows| rows.values())
            .map(|kinds| kinds.iter().filter(|k| **k == kind).count())
            .sum()
    }

    /// Number of flagged cells.
    pub fn flagged_cells(&self) -> usize {
        self.columns.values().map(|rows| rows.len()).sum()
    }

    /// Check whether nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.columns.values().all(|rows| rows.is_empty())
    }

    /// Per-column counts by kind.
    pub fn summary(&self) -> IndexMap<String, BTreeMap<ErrorKind, usize>> {
        self.columns
            .iter()
            .map(|(column, rows)| {
                let mut counts = BTreeMap::new();
                for kind in rows.values().flatten() {
                    *counts.entry(*kind).or_insert(0) += 1;
                }
                (column.clone(), counts)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_appends_in_order() {
        let mut first = PartialColumnErrorMap::new();
        first.entry("a".to_string()).or_default().insert(1, ErrorKind::Missing);
        let mut second = PartialColumnErrorMap::new();
        second.entry("a".to_string()).or_default().insert(1, ErrorKind::Mismatch);
        second.entry("b".to_string()).or_default().insert(2, ErrorKind::Anomaly);

        let map = ColumnErrorMap::merge(vec![first, second]);
        assert_eq!(map.kinds("a", 1), &[ErrorKind::Missing, ErrorKind::Mismatch]);
        assert_eq!(map.kinds("b", 2), &[ErrorKind::Anomaly]);
        assert!(map.kinds("b", 1).is_empty());
        assert_eq!(map.count(ErrorKind::Anomaly), 1);
        assert_eq!(map.flagged_cells(), 2);
    }

    #[test]
    fn test_serializes_lowercase() {
        let mut partial = PartialColumnErrorMap::new();
        partial.entry("a".to_string()).or_default().insert(3, ErrorKind::Incomplete);
        let map = ColumnErrorMap::merge(vec![partial]);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":{"3":["incomplete"]}}"#);
    }
}
