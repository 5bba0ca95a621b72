//! Scour: analytical backend for interactive tabular data cleaning.
//!
//! Scour loads a table, tags suspicious cells with pluggable detectors, bins
//! columns into hybrid numeric/categorical histograms for visual inspection,
//! and records every cleaning action so it can be undone, audited and
//! replayed as a pandas script.
//!
//! # Core Principles
//!
//! - **Non-destructive**: every mutation yields a new table snapshot
//! - **Full provenance**: the action log survives undo and redo
//! - **Pluggable**: detectors and wranglers are looked up by name
//!
//! # Example
//!
//! ```no_run
//! use scour::{Session, SessionConfig};
//!
//! let mut session = Session::open("people.csv", SessionConfig::default()).unwrap();
//! println!("Flagged cells: {}", session.error_map().flagged_cells());
//!
//! let histogram = session.histogram("age").unwrap();
//! let outliers: Vec<_> = histogram.numeric_bins.last().unwrap().ids.clone();
//! session.select(outliers);
//! session.apply_wrangler("remove_selected", "age", None).unwrap();
//!
//! println!("{}", session.export_script());
//! ```

pub mod binning;
pub mod detection;
pub mod error;
pub mod history;
pub mod input;
pub mod session;
pub mod table;

pub use binning::{BinningConfig, Histogram1D, Histogram2D, HybridBinningEngine};
pub use detection::{ColumnErrorMap, DetectorDescriptor, ErrorDetectionEngine, ErrorKind};
pub use error::{Result, ScourError};
pub use history::{TransformationHistory, TransformationRecord};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use session::{Session, SessionConfig, SessionSummary};
pub use table::{Table, Value};
