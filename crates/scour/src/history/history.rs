//! Working table with linear undo/redo and an independent provenance log.

use tracing::{debug, info};

use crate::error::Result;
use crate::table::{Row, RowId, Table, Value};

use super::record::{TransformationInfo, TransformationKind, TransformationRecord};
use super::script::ScriptExporter;

/// Owns the working table, undo/redo stacks and the provenance log.
///
/// Undo and redo only move table snapshots; the provenance log keeps every
/// action ever taken so the exported script reflects the operator's full
/// session. Callers must re-run detection after every mutating call.
#[derive(Debug, Clone)]
pub struct TransformationHistory {
    working_table: Table,
    original_row_count: usize,
    undo_stack: Vec<Table>,
    redo_stack: Vec<Table>,
    log: Vec<TransformationRecord>,
    pending_selection: Vec<RowId>,
}

impl TransformationHistory {
    /// Start a history for a freshly loaded table.
    pub fn new(table: Table) -> Self {
        Self {
            original_row_count: table.row_count(),
            working_table: table,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            log: Vec::new(),
            pending_selection: Vec::new(),
        }
    }

    /// Replace the dataset, clearing stacks, log and selection.
    pub fn reset(&mut self, table: Table) {
        *self = Self::new(table);
    }

    /// The current working table.
    pub fn table(&self) -> &Table {
        &self.working_table
    }

    /// Row count of the table as loaded.
    pub fn original_row_count(&self) -> usize {
        self.original_row_count
    }

    /// All recorded actions, oldest first.
    pub fn log(&self) -> &[TransformationRecord] {
        &self.log
    }

    /// Rows currently selected by the operator.
    pub fn selection(&self) -> &[RowId] {
        &self.pending_selection
    }

    /// Set the operator's selection.
    pub fn set_selection(&mut self, ids: Vec<RowId>) {
        self.pending_selection = ids;
    }

    /// Whether `undo` would do anything.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether `redo` would do anything.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Keep only rows for which `predicate` holds.
    ///
    /// The predicate sees the pre-filter table. If it fails, nothing changes
    /// and the error is returned.
    pub fn filter_rows<P>(&mut self, predicate: P, info: TransformationInfo) -> Result<()>
    where
        P: FnMut(&Row) -> Result<bool>,
    {
        let next = self.working_table.filter(predicate)?;
        info!(
            "Removed {} rows ({} -> {})",
            self.working_table.row_count() - next.row_count(),
            self.working_table.row_count(),
            next.row_count()
        );
        self.commit(next, TransformationRecord::new(TransformationKind::Remove, info));
        Ok(())
    }

    /// Recompute `column` for every row with `value_fn`.
    ///
    /// If the value function fails, nothing changes and the error is returned.
    pub fn derive_column<F>(&mut self, column: &str, value_fn: F, info: TransformationInfo) -> Result<()>
    where
        F: FnMut(&Row) -> Result<Value>,
    {
        let next = self.working_table.derive(column, value_fn)?;
        info!("Recomputed column '{}'", column);
        self.commit(next, TransformationRecord::new(TransformationKind::Transform, info));
        Ok(())
    }

    fn commit(&mut self, next: Table, record: TransformationRecord) {
        let previous = std::mem::replace(&mut self.working_table, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        self.log.push(record);
    }

    /// Step back one mutation. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(table) => {
                let current = std::mem::replace(&mut self.working_table, table);
                self.redo_stack.push(current);
                debug!("Undo ({} more available)", self.undo_stack.len());
                true
            }
            None => false,
        }
    }

    /// Re-apply one undone mutation. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(table) => {
                let current = std::mem::replace(&mut self.working_table, table);
                self.undo_stack.push(current);
                debug!("Redo ({} more available)", self.redo_stack.len());
                true
            }
            None => false,
        }
    }

    /// Render the provenance log as a script that replays it against the
    /// original file.
    pub fn export_script(&self, original_filename: &str) -> String {
        ScriptExporter::new(original_filename, self.original_row_count).render(&self.log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScourError;
    use crate::table::ingest;

    fn table() -> Table {
        ingest(
            vec!["x".to_string()],
            (1..=5).map(|i| vec![Value::Number(i as f64)]).collect(),
        )
    }

    fn info(ids: &[RowId]) -> TransformationInfo {
        TransformationInfo {
            affected_ids: ids.to_vec(),
            x_column: "x".to_string(),
            x_values: ids.iter().map(|id| Value::Number(*id as f64)).collect(),
            ..TransformationInfo::default()
        }
    }

    #[test]
    fn test_undo_restores_pre_filter_table() {
        let mut history = TransformationHistory::new(table());
        let before = history.table().clone();

        history
            .filter_rows(|row| Ok(row.id() != 2), info(&[2]))
            .unwrap();
        let after = history.table().clone();
        assert_eq!(after.row_count(), 4);

        assert!(history.undo());
        assert_eq!(history.table(), &before);
        assert!(history.redo());
        assert_eq!(history.table(), &after);
        assert_eq!(history.log().len(), 1);
    }

    #[test]
    fn test_undo_restores_pre_derive_table() {
        let mut history = TransformationHistory::new(table());
        let before = history.table().clone();
        history
            .derive_column("x", |row| Ok(Value::Number(row.id() as f64 * 10.0)), info(&[1]))
            .unwrap();
        assert_eq!(history.table().row(3).unwrap().value("x"), &Value::Number(30.0));
        history.undo();
        assert_eq!(history.table(), &before);
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut history = TransformationHistory::new(table());
        history.filter_rows(|row| Ok(row.id() != 1), info(&[1])).unwrap();
        history.filter_rows(|row| Ok(row.id() != 2), info(&[2])).unwrap();
        history.undo();
        history.undo();
        assert!(history.can_redo());

        history.filter_rows(|row| Ok(row.id() != 5), info(&[5])).unwrap();
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(history.log().len(), 3);
    }

    #[test]
    fn test_undo_redo_on_empty_stacks() {
        let mut history = TransformationHistory::new(table());
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.table().row_count(), 5);
    }

    #[test]
    fn test_failing_predicate_changes_nothing() {
        let mut history = TransformationHistory::new(table());
        let result = history.filter_rows(
            |row| {
                if row.id() == 3 {
                    Err(ScourError::Wrangler("bad row".to_string()))
                } else {
                    Ok(true)
                }
            },
            info(&[3]),
        );
        assert!(result.is_err());
        assert!(!history.can_undo());
        assert!(history.log().is_empty());
        assert_eq!(history.table().row_count(), 5);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut history = TransformationHistory::new(table());
        history.set_selection(vec![1]);
        history.filter_rows(|_| Ok(false), info(&[1, 2, 3, 4, 5])).unwrap();
        history.reset(table());
        assert!(!history.can_undo());
        assert!(history.log().is_empty());
        assert!(history.selection().is_empty());
        assert_eq!(history.original_row_count(), 5);
    }
}
