//! Hybrid binning: numeric values in equal-width bins, everything else in
//! one bin per category, both on the same axis.
//!
//! Null and NaN land in a trailing `NaN` category bin, so every row of the
//! table falls in exactly one bin (1D) or one cell (2D).

mod axis;
mod bins;
mod engine;
mod scale;

pub use bins::{AxisPairing, Bin, BinKey, Cell, ErrorTally};
pub use engine::{
    BinningConfig, DEFAULT_BIN_COUNT, DEFAULT_GAP, Histogram1D, Histogram2D, HybridBinningEngine,
};
pub use scale::HybridScale;
