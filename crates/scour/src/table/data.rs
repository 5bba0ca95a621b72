//! Immutable row-oriented table keyed by a stable row ID.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScourError};

use super::value::Value;

/// Stable row identifier.
pub type RowId = u64;

/// Name of the identifier column every table carries.
pub const ID_COLUMN: &str = "ID";

/// A single row: its ID plus column → value cells (the ID column included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: RowId,
    cells: IndexMap<String, Value>,
}

impl Row {
    pub(crate) fn new(id: RowId, cells: IndexMap<String, Value>) -> Self {
        Self { id, cells }
    }

    /// The stable row ID.
    pub fn id(&self) -> RowId {
        self.id
    }

    /// Get a cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Get a cell, treating absent columns as `Null`.
    pub fn value(&self, column: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.cells.get(column).unwrap_or(&NULL)
    }

    /// Iterate cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An ordered, logically immutable table.
///
/// Every transformation returns a new `Table`; the ID column is unique and
/// never rewritten after ingestion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table from rows that already satisfy the ID invariant.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names, `ID` first.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns other than `ID`.
    pub fn data_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(|c| c.as_str())
            .filter(|c| *c != ID_COLUMN)
    }

    /// Whether a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// All rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (the ID column included).
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row IDs in order.
    pub fn ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().map(|r| r.id)
    }

    /// Find a row by ID.
    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// `(id, value)` pairs for a column. Missing cells read as `Null`.
    pub fn column_values<'a>(
        &'a self,
        column: &'a str,
    ) -> impl Iterator<Item = (RowId, &'a Value)> + 'a {
        self.rows.iter().map(move |row| (row.id, row.value(column)))
    }

    /// Return a new table holding the rows for which `predicate` is true.
    ///
    /// The first predicate error aborts the filter and is returned as-is.
    pub fn filter<P>(&self, mut predicate: P) -> Result<Table>
    where
        P: FnMut(&Row) -> Result<bool>,
    {
        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            if predicate(row)? {
                rows.push(row.clone());
            }
        }
        Ok(Table::from_parts(self.columns.clone(), rows))
    }

    /// Return a new table where `column` is recomputed from `value_fn`.
    ///
    /// Unknown columns are appended; the ID column cannot be derived.
    pub fn derive<F>(&self, column: &str, mut value_fn: F) -> Result<Table>
    where
        F: FnMut(&Row) -> Result<Value>,
    {
        if column == ID_COLUMN {
            return Err(ScourError::Config(format!(
                "Column '{}' is the row identifier and cannot be derived",
                ID_COLUMN
            )));
        }

        let mut columns = self.columns.clone();
        if !self.has_column(column) {
            columns.push(column.to_string());
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let value = value_fn(row)?;
            let mut cells = row.cells.clone();
            cells.insert(column.to_string(), value);
            rows.push(Row::new(row.id, cells));
        }
        Ok(Table::from_parts(columns, rows))
    }

    /// Check that a column exists.
    pub fn require_column(&self, column: &str) -> Result<()> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(ScourError::ColumnNotFound(column.to_string()))
        }
    }
}
