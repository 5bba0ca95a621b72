//! One- and two-dimensional hybrid histograms.

use std::collections::BTreeMap;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::detection::{ColumnErrorMap, ErrorKind};
use crate::error::Result;
use crate::table::{RowId, Table};

use super::axis::{AxisBins, Slot};
use super::bins::{AxisPairing, Bin, BinKey, Cell, ErrorTally};
use super::scale::HybridScale;

/// Default number of numeric bins per axis.
pub const DEFAULT_BIN_COUNT: usize = 10;

/// Default gap between the numeric and categorical segments of a scale.
pub const DEFAULT_GAP: f64 = 10.0;

/// Binning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    /// Equal-width numeric bins per axis (at least 1).
    pub bin_count: usize,
    /// Gap inserted between the numeric and categorical segments.
    pub gap: f64,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            bin_count: DEFAULT_BIN_COUNT,
            gap: DEFAULT_GAP,
        }
    }
}

impl BinningConfig {
    /// Set the numeric bin count.
    pub fn with_bin_count(mut self, bin_count: usize) -> Self {
        self.bin_count = bin_count.max(1);
        self
    }

    /// Set the scale gap.
    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }
}

/// A one-dimensional hybrid histogram over one column.
///
/// Serializes as `{column, bins, numeric_bins, categorical_bins}`, where
/// `bins` is the numeric bins followed by the categorical bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub column: String,
    /// All `bin_count` numeric bins, empty ones included.
    pub numeric_bins: Vec<Bin>,
    /// One bin per distinct category, sorted, NaN placeholder last.
    pub categorical_bins: Vec<Bin>,
    gap: f64,
    numeric_domain: Option<(f64, f64)>,
}

impl Serialize for Histogram1D {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let bins: Vec<&Bin> = self.bins().collect();
        let mut state = serializer.serialize_struct("Histogram1D", 4)?;
        state.serialize_field("column", &self.column)?;
        state.serialize_field("bins", &bins)?;
        state.serialize_field("numeric_bins", &self.numeric_bins)?;
        state.serialize_field("categorical_bins", &self.categorical_bins)?;
        state.end()
    }
}

impl Histogram1D {
    /// Numeric bins followed by categorical bins.
    pub fn bins(&self) -> impl Iterator<Item = &Bin> {
        self.numeric_bins.iter().chain(self.categorical_bins.iter())
    }

    /// Total number of binned rows.
    pub fn total(&self) -> usize {
        self.bins().map(Bin::len).sum()
    }

    /// Scale mapping this histogram onto `[start, end]`.
    pub fn scale(&self, start: f64, end: f64) -> HybridScale {
        HybridScale::new(
            (start, end),
            self.gap,
            self.numeric_bins.len(),
            self.categorical_bins.len(),
            self.numeric_domain,
        )
    }
}

/// A two-dimensional hybrid histogram over a column pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram2D {
    pub x_column: String,
    pub y_column: String,
    /// Non-empty cells, grouped by pairing (numeric/numeric first), then by
    /// x bin and y bin.
    pub cells: Vec<Cell>,
    pub numeric_bins_x: Vec<BinKey>,
    pub categorical_bins_x: Vec<BinKey>,
    pub numeric_bins_y: Vec<BinKey>,
    pub categorical_bins_y: Vec<BinKey>,
    #[serde(skip)]
    gap: f64,
    #[serde(skip)]
    x_domain: Option<(f64, f64)>,
    #[serde(skip)]
    y_domain: Option<(f64, f64)>,
}

impl Histogram2D {
    /// Cells for one pairing.
    pub fn cells_for(&self, pairing: AxisPairing) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| cell.pairing == pairing)
    }

    /// Total number of binned rows.
    pub fn total(&self) -> usize {
        self.cells.iter().map(|cell| cell.ids.len()).sum()
    }

    /// Scale for the x axis.
    pub fn scale_x(&self, start: f64, end: f64) -> HybridScale {
        HybridScale::new(
            (start, end),
            self.gap,
            self.numeric_bins_x.len(),
            self.categorical_bins_x.len(),
            self.x_domain,
        )
    }

    /// Scale for the y axis.
    pub fn scale_y(&self, start: f64, end: f64) -> HybridScale {
        HybridScale::new(
            (start, end),
            self.gap,
            self.numeric_bins_y.len(),
            self.categorical_bins_y.len(),
            self.y_domain,
        )
    }
}

/// Builds hybrid histograms from a table and its error map.
#[derive(Debug, Clone, Default)]
pub struct HybridBinningEngine {
    config: BinningConfig,
}

impl HybridBinningEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: BinningConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &BinningConfig {
        &self.config
    }

    fn bin_count(&self) -> usize {
        self.config.bin_count.max(1)
    }

    /// Bin every row of `table` by `column`.
    pub fn histogram_1d(
        &self,
        table: &Table,
        errors: &ColumnErrorMap,
        column: &str,
    ) -> Result<Histogram1D> {
        table.require_column(column)?;
        let axis = AxisBins::build(table.column_values(column).map(|(_, v)| v), self.bin_count());

        let mut numeric_bins: Vec<Bin> = axis.numeric_keys().into_iter().map(Bin::new).collect();
        let mut categorical_bins: Vec<Bin> =
            axis.categorical_keys().into_iter().map(Bin::new).collect();

        for (id, value) in table.column_values(column) {
            let bin = match axis.slot(value) {
                Some(Slot::Numeric(idx)) => numeric_bins.get_mut(idx),
                Some(Slot::Categorical(idx)) => categorical_bins.get_mut(idx),
                None => None,
            };
            if let Some(bin) = bin {
                bin.ids.push(id);
                bin.errors.add(errors.kinds(column, id));
            }
        }

        debug!(
            "Histogram on '{}': {} numeric bin(s), {} categorical bin(s)",
            column,
            numeric_bins.len(),
            categorical_bins.len()
        );

        Ok(Histogram1D {
            column: column.to_string(),
            numeric_bins,
            categorical_bins,
            gap: self.config.gap,
            numeric_domain: axis.numeric_domain(),
        })
    }

    /// Bin every row of `table` by the `(x_column, y_column)` pair.
    ///
    /// Each axis is laid out exactly as its 1D histogram would be, so all
    /// four pairings share the same bin edges and categories. A cell's tally
    /// combines the row's tags from both columns.
    pub fn histogram_2d(
        &self,
        table: &Table,
        errors: &ColumnErrorMap,
        x_column: &str,
        y_column: &str,
    ) -> Result<Histogram2D> {
        table.require_column(x_column)?;
        table.require_column(y_column)?;

        let bin_count = self.bin_count();
        let x_axis = AxisBins::build(table.column_values(x_column).map(|(_, v)| v), bin_count);
        let y_axis = AxisBins::build(table.column_values(y_column).map(|(_, v)| v), bin_count);

        let mut grid: BTreeMap<(AxisPairing, Slot, Slot), (Vec<RowId>, ErrorTally)> =
            BTreeMap::new();
        for row in table.rows() {
            let sx = x_axis.slot(row.value(x_column));
            let sy = y_axis.slot(row.value(y_column));
            let (Some(sx), Some(sy)) = (sx, sy) else {
                continue;
            };
            let pairing = AxisPairing::of(sx.is_numeric(), sy.is_numeric());
            let mut kinds: Vec<ErrorKind> = errors.kinds(x_column, row.id()).to_vec();
            kinds.extend_from_slice(errors.kinds(y_column, row.id()));

            let (ids, tally) = grid.entry((pairing, sx, sy)).or_default();
            ids.push(row.id());
            tally.add(&kinds);
        }

        let cells: Vec<Cell> = grid
            .into_iter()
            .filter_map(|((pairing, sx, sy), (ids, errors))| {
                Some(Cell {
                    pairing,
                    x: x_axis.key(sx)?,
                    y: y_axis.key(sy)?,
                    ids,
                    errors,
                })
            })
            .collect();

        debug!(
            "Grid on '{}' x '{}': {} non-empty cell(s)",
            x_column,
            y_column,
            cells.len()
        );

        Ok(Histogram2D {
            x_column: x_column.to_string(),
            y_column: y_column.to_string(),
            cells,
            numeric_bins_x: x_axis.numeric_keys(),
            categorical_bins_x: x_axis.categorical_keys(),
            numeric_bins_y: y_axis.numeric_keys(),
            categorical_bins_y: y_axis.categorical_keys(),
            gap: self.config.gap,
            x_domain: x_axis.numeric_domain(),
            y_domain: y_axis.numeric_domain(),
        })
    }
}
