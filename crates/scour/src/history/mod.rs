//! Cleaning history: working table, linear undo/redo, and a provenance log
//! that is exported as a replay script.
//!
//! # Usage
//!
//! ```
//! use scour::history::{TransformationHistory, TransformationInfo};
//! use scour::table::{Value, ingest};
//!
//! let table = ingest(
//!     vec!["age".to_string()],
//!     vec![vec![Value::Number(31.0)], vec![Value::Number(999.0)]],
//! );
//! let mut history = TransformationHistory::new(table);
//!
//! let info = TransformationInfo {
//!     affected_ids: vec![2],
//!     x_column: "age".to_string(),
//!     x_values: vec![Value::Number(999.0)],
//!     ..TransformationInfo::default()
//! };
//! history.filter_rows(|row| Ok(row.id() != 2), info).unwrap();
//! assert_eq!(history.table().row_count(), 1);
//!
//! history.undo();
//! assert_eq!(history.table().row_count(), 2);
//!
//! let script = history.export_script("ages.csv");
//! assert!(script.contains("df = df[~((df[\"age\"] == 999))]"));
//! ```

#[allow(clippy::module_inception)]
mod history;
mod persistence;
mod record;
mod script;
mod wrangler;

pub use history::TransformationHistory;
pub use persistence::provenance_path;
pub use record::{TransformationInfo, TransformationKind, TransformationRecord};
pub use script::ScriptExporter;
pub use wrangler::{
    ImputeConstant, ImputeMean, ImputeMedian, ImputeMode, RemoveSelected, RowPredicate,
    RowValueFn, Wrangler, WranglerOutput, WranglerRegistry, impute_selection,
};
