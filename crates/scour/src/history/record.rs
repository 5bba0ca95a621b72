//! Provenance records for cleaning actions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::detection::{ColumnErrorMap, ErrorKind};
use crate::table::{Row, RowId, Table, Value};

/// What a cleaning action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationKind {
    /// Rows were removed.
    Remove,
    /// A column was recomputed (typically imputation).
    Transform,
}

impl TransformationKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            TransformationKind::Remove => "remove",
            TransformationKind::Transform => "transform",
        }
    }
}

/// Caller-supplied description of the rows an action touches.
///
/// The recorded x/y values are what script export matches on, so they must
/// be captured from the table *before* the action runs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformationInfo {
    /// Rows the operator selected.
    pub affected_ids: Vec<RowId>,
    /// Primary column of the selection.
    pub x_column: String,
    /// Values of `x_column` for each affected row.
    pub x_values: Vec<Value>,
    /// Secondary column for 2D selections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_column: Option<String>,
    /// Values of `y_column` for each affected row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_values: Option<Vec<Value>>,
    /// Column receiving an imputed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imputed_column: Option<String>,
    /// The imputed value, when it is a constant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imputed_value: Option<Value>,
    /// Error tags carried by the affected rows at the time of the action.
    #[serde(default)]
    pub errors_by_id: IndexMap<RowId, Vec<ErrorKind>>,
}

impl TransformationInfo {
    /// Capture a selection from the current table and error map.
    ///
    /// IDs that are not present in `table` are ignored.
    pub fn from_selection(
        table: &Table,
        ids: &[RowId],
        x_column: &str,
        y_column: Option<&str>,
        errors: &ColumnErrorMap,
    ) -> Self {
        let mut info = Self {
            x_column: x_column.to_string(),
            y_column: y_column.map(str::to_string),
            y_values: y_column.map(|_| Vec::new()),
            ..Self::default()
        };

        let rows: HashMap<RowId, &Row> = table.rows().iter().map(|row| (row.id(), row)).collect();
        for &id in ids {
            let Some(row) = rows.get(&id) else {
                continue;
            };
            info.affected_ids.push(id);
            info.x_values.push(row.value(x_column).clone());

            let mut kinds = errors.kinds(x_column, id).to_vec();
            if let (Some(y), Some(values)) = (y_column, info.y_values.as_mut()) {
                values.push(row.value(y).clone());
                kinds.extend_from_slice(errors.kinds(y, id));
            }
            if !kinds.is_empty() {
                info.errors_by_id.insert(id, kinds);
            }
        }

        info
    }

    /// Mark the action as an imputation of `value` into `column`.
    pub fn with_imputation(mut self, column: impl Into<String>, value: Option<Value>) -> Self {
        self.imputed_column = Some(column.into());
        self.imputed_value = value;
        self
    }
}

/// Immutable log entry for one cleaning action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationRecord {
    pub kind: TransformationKind,
    pub affected_ids: Vec<RowId>,
    pub x_column: String,
    pub x_values: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imputed_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imputed_value: Option<Value>,
    #[serde(default)]
    pub errors_by_id: IndexMap<RowId, Vec<ErrorKind>>,
    /// When the action was taken.
    pub recorded_at: DateTime<Utc>,
}

impl TransformationRecord {
    /// Create a record from caller-supplied info.
    pub fn new(kind: TransformationKind, info: TransformationInfo) -> Self {
        Self {
            kind,
            affected_ids: info.affected_ids,
            x_column: info.x_column,
            x_values: info.x_values,
            y_column: info.y_column,
            y_values: info.y_values,
            imputed_column: info.imputed_column,
            imputed_value: info.imputed_value,
            errors_by_id: info.errors_by_id,
            recorded_at: Utc::now(),
        }
    }

    /// Column that receives the imputed value (defaults to the x column).
    pub fn target_column(&self) -> &str {
        self.imputed_column.as_deref().unwrap_or(&self.x_column)
    }

    /// Selection columns, e.g. `age` or `age/income`.
    fn selection_label(&self) -> String {
        match self.y_column {
            Some(ref y) => format!("{}/{}", self.x_column, y),
            None => self.x_column.clone(),
        }
    }

    /// Get a human-readable description of the action.
    pub fn description(&self) -> String {
        let rows = self.affected_ids.len();
        let plural = if rows == 1 { "" } else { "s" };
        match self.kind {
            TransformationKind::Remove => {
                format!("Remove {} row{} selected on {}", rows, plural, self.selection_label())
            }
            TransformationKind::Transform => match self.imputed_value {
                Some(ref value) => format!(
                    "Impute {} = {} on {} row{} selected on {}",
                    self.target_column(),
                    value,
                    rows,
                    plural,
                    self.selection_label()
                ),
                None => format!(
                    "Transform {} on {} row{} selected on {}",
                    self.target_column(),
                    rows,
                    plural,
                    self.selection_label()
                ),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectorRegistry, DetectorDescriptor, ErrorDetectionEngine};
    use crate::table::ingest;

    #[test]
    fn test_from_selection_captures_values_and_errors() {
        let table = ingest(
            vec!["city".to_string(), "pop".to_string()],
            vec![
                vec!["Oslo".into(), Value::Number(700.0)],
                vec![Value::Null, Value::Number(5.0)],
            ],
        );
        let errors = ErrorDetectionEngine::run_descriptors(
            &table,
            &DetectorRegistry::with_defaults(),
            &DetectorDescriptor::defaults(),
        )
        .unwrap();

        let info = TransformationInfo::from_selection(&table, &[2, 99], "city", Some("pop"), &errors);
        assert_eq!(info.affected_ids, vec![2]);
        assert_eq!(info.x_values, vec![Value::Null]);
        assert_eq!(info.y_values, Some(vec![Value::Number(5.0)]));
        assert_eq!(info.errors_by_id[&2][0], ErrorKind::Missing);
    }

    #[test]
    fn test_from_selection_large_table_keeps_selection_order() {
        let table = ingest(
            vec!["n".to_string()],
            (0..20_000).map(|i| vec![Value::Number(i as f64)]).collect(),
        );
        let ids: Vec<RowId> = (1..=20_000).rev().step_by(2).collect();

        let info =
            TransformationInfo::from_selection(&table, &ids, "n", None, &ColumnErrorMap::default());
        assert_eq!(info.affected_ids, ids);
        assert_eq!(info.x_values[0], Value::Number(19_999.0));
        assert_eq!(info.x_values.last(), Some(&Value::Number(1.0)));
        assert_eq!(info.y_values, None);
    }

    #[test]
    fn test_description() {
        let info = TransformationInfo {
            affected_ids: vec![1, 2],
            x_column: "age".to_string(),
            x_values: vec![Value::Null, Value::Null],
            ..TransformationInfo::default()
        };
        let record = TransformationRecord::new(
            TransformationKind::Transform,
            info.with_imputation("age", Some(Value::Number(30.0))),
        );
        assert_eq!(record.description(), "Impute age = 30 on 2 rows selected on age");
        assert_eq!(record.target_column(), "age");
    }
}
