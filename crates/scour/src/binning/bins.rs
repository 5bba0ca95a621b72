//! Bin and cell types with per-error-kind tallies.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::detection::ErrorKind;
use crate::table::{RowId, format_number};

/// Identity of a bin on one axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BinKey {
    /// `[lower_bound, upper_bound)`; the last numeric bin is closed.
    Numeric { lower_bound: f64, upper_bound: f64 },
    /// One distinct trimmed value (or the NaN placeholder).
    Categorical { category: String },
}

impl BinKey {
    /// Whether this is a numeric bin.
    pub fn is_numeric(&self) -> bool {
        matches!(self, BinKey::Numeric { .. })
    }
}

impl fmt::Display for BinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinKey::Numeric {
                lower_bound,
                upper_bound,
            } => write!(
                f,
                "[{}, {})",
                format_number(*lower_bound),
                format_number(*upper_bound)
            ),
            BinKey::Categorical { category } => write!(f, "{}", category),
        }
    }
}

/// Counts of error kinds over a bin's members.
///
/// Each tag occurrence counts once; members with no tag count toward `none`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorTally {
    pub counts: BTreeMap<ErrorKind, usize>,
    pub none: usize,
}

impl ErrorTally {
    /// Add one member's tags.
    pub fn add(&mut self, kinds: &[ErrorKind]) {
        if kinds.is_empty() {
            self.none += 1;
            return;
        }
        for kind in kinds {
            *self.counts.entry(*kind).or_insert(0) += 1;
        }
    }

    /// Occurrences of one kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }
}

/// A one-dimensional bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bin {
    #[serde(flatten)]
    pub key: BinKey,
    pub ids: Vec<RowId>,
    pub errors: ErrorTally,
}

impl Bin {
    pub(crate) fn new(key: BinKey) -> Self {
        Self {
            key,
            ids: Vec::new(),
            errors: ErrorTally::default(),
        }
    }

    /// Number of member rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check whether the bin has no members.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Which value types meet in a 2D cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPairing {
    NumericNumeric,
    NumericCategorical,
    CategoricalNumeric,
    CategoricalCategorical,
}

impl AxisPairing {
    pub(crate) fn of(x_numeric: bool, y_numeric: bool) -> Self {
        match (x_numeric, y_numeric) {
            (true, true) => AxisPairing::NumericNumeric,
            (true, false) => AxisPairing::NumericCategorical,
            (false, true) => AxisPairing::CategoricalNumeric,
            (false, false) => AxisPairing::CategoricalCategorical,
        }
    }
}

/// A two-dimensional cell: one x bin crossed with one y bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub pairing: AxisPairing,
    pub x: BinKey,
    pub y: BinKey,
    pub ids: Vec<RowId>,
    pub errors: ErrorTally,
}
