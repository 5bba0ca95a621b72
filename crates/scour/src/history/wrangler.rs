//! Wrangler plugins: compute a repair for the operator's selection.
//!
//! A wrangler returns either a row predicate (consumed by
//! [`TransformationHistory::filter_rows`](super::TransformationHistory::filter_rows))
//! or a per-row value function (consumed by
//! [`TransformationHistory::derive_column`](super::TransformationHistory::derive_column)).

use std::collections::HashSet;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::warn;

use crate::detection::MissingValueDetector;
use crate::error::{Result, ScourError};
use crate::table::{Row, RowId, Table, Value};

/// Boxed row predicate.
pub type RowPredicate = Box<dyn FnMut(&Row) -> Result<bool>>;

/// Boxed per-row value function.
pub type RowValueFn = Box<dyn FnMut(&Row) -> Result<Value>>;

/// What a wrangler asks the history to do.
pub enum WranglerOutput {
    /// Keep rows for which the predicate holds.
    Filter { predicate: RowPredicate },
    /// Recompute the target column; `imputed_value` is set when every
    /// selected row receives the same constant.
    Derive {
        value_fn: RowValueFn,
        imputed_value: Option<Value>,
    },
}

impl std::fmt::Debug for WranglerOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WranglerOutput::Filter { .. } => f.write_str("Filter"),
            WranglerOutput::Derive { imputed_value, .. } => f
                .debug_struct("Derive")
                .field("imputed_value", imputed_value)
                .finish(),
        }
    }
}

/// A repair plugin.
pub trait Wrangler: Send + Sync {
    /// Stable name used in logs and registries.
    fn name(&self) -> &str;

    /// Build the repair for `selection` in `column` of `table`.
    fn wrangle(&self, column: &str, table: &Table, selection: &[RowId]) -> Result<WranglerOutput>;
}

/// Replace the selected rows' `column` with `value`, keep everything else.
pub fn impute_selection(column: &str, selection: &[RowId], value: Value) -> WranglerOutput {
    let column = column.to_string();
    let selected: HashSet<RowId> = selection.iter().copied().collect();
    let constant = value.clone();
    WranglerOutput::Derive {
        value_fn: Box::new(move |row: &Row| {
            Ok(if selected.contains(&row.id()) {
                constant.clone()
            } else {
                row.value(&column).clone()
            })
        }),
        imputed_value: Some(value),
    }
}

/// Values of `column` outside the selection.
fn unselected<'a>(
    table: &'a Table,
    column: &'a str,
    selection: &[RowId],
) -> impl Iterator<Item = &'a Value> + 'a {
    let selected: HashSet<RowId> = selection.iter().copied().collect();
    table
        .column_values(column)
        .filter(move |(id, _)| !selected.contains(id))
        .map(|(_, value)| value)
}

/// Removes the selected rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveSelected;

impl Wrangler for RemoveSelected {
    fn name(&self) -> &str {
        "remove_selected"
    }

    fn wrangle(&self, _column: &str, _table: &Table, selection: &[RowId]) -> Result<WranglerOutput> {
        let selected: HashSet<RowId> = selection.iter().copied().collect();
        Ok(WranglerOutput::Filter {
            predicate: Box::new(move |row: &Row| Ok(!selected.contains(&row.id()))),
        })
    }
}

/// Imputes the mean of the unselected numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImputeMean;

impl Wrangler for ImputeMean {
    fn name(&self) -> &str {
        "impute_mean"
    }

    fn wrangle(&self, column: &str, table: &Table, selection: &[RowId]) -> Result<WranglerOutput> {
        table.require_column(column)?;
        let values: Vec<f64> = unselected(table, column, selection)
            .filter_map(Value::as_number)
            .collect();
        if values.is_empty() {
            return Err(ScourError::Wrangler(format!(
                "No numeric values in '{}' to compute a mean from",
                column
            )));
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Ok(impute_selection(column, selection, Value::Number(mean)))
    }
}

/// Imputes the median of the unselected numeric values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImputeMedian;

impl Wrangler for ImputeMedian {
    fn name(&self) -> &str {
        "impute_median"
    }

    fn wrangle(&self, column: &str, table: &Table, selection: &[RowId]) -> Result<WranglerOutput> {
        table.require_column(column)?;
        let mut values: Vec<f64> = unselected(table, column, selection)
            .filter_map(Value::as_number)
            .collect();
        if values.is_empty() {
            return Err(ScourError::Wrangler(format!(
                "No numeric values in '{}' to compute a median from",
                column
            )));
        }
        values.sort_by(|a, b| a.total_cmp(b));
        let mid = values.len() / 2;
        let median = if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        };
        Ok(impute_selection(column, selection, Value::Number(median)))
    }
}

/// Imputes the most frequent unselected, non-missing value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImputeMode;

impl Wrangler for ImputeMode {
    fn name(&self) -> &str {
        "impute_mode"
    }

    fn wrangle(&self, column: &str, table: &Table, selection: &[RowId]) -> Result<WranglerOutput> {
        table.require_column(column)?;
        let mut counts: IndexMap<String, (usize, &Value)> = IndexMap::new();
        for value in unselected(table, column, selection) {
            if value.is_null_like() || MissingValueDetector::is_missing(value) {
                continue;
            }
            counts.entry(value.dedup_key()).or_insert((0, value)).0 += 1;
        }

        let mut best: Option<(usize, &Value)> = None;
        for (count, value) in counts.into_values() {
            match best {
                Some((best_count, _)) if count <= best_count => {}
                _ => best = Some((count, value)),
            }
        }

        match best {
            Some((_, value)) => Ok(impute_selection(column, selection, value.clone())),
            None => Err(ScourError::Wrangler(format!(
                "No present values in '{}' to compute a mode from",
                column
            ))),
        }
    }
}

/// Imputes a fixed constant.
#[derive(Debug, Clone)]
pub struct ImputeConstant {
    value: Value,
}

impl ImputeConstant {
    /// Create a constant imputer.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl Wrangler for ImputeConstant {
    fn name(&self) -> &str {
        "impute_constant"
    }

    fn wrangle(&self, column: &str, table: &Table, selection: &[RowId]) -> Result<WranglerOutput> {
        table.require_column(column)?;
        Ok(impute_selection(column, selection, self.value.clone()))
    }
}

/// Registry of available wranglers.
#[derive(Clone, Default)]
pub struct WranglerRegistry {
    wranglers: IndexMap<String, Arc<dyn Wrangler>>,
}

impl WranglerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in wranglers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("remove_selected", RemoveSelected);
        registry.register("impute_mean", ImputeMean);
        registry.register("impute_median", ImputeMedian);
        registry.register("impute_mode", ImputeMode);
        registry
    }

    /// Register (or replace) a wrangler under a key.
    pub fn register(&mut self, code: impl Into<String>, wrangler: impl Wrangler + 'static) {
        self.wranglers.insert(code.into(), Arc::new(wrangler));
    }

    /// Registered keys, in registration order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.wranglers.keys().map(|k| k.as_str())
    }

    /// Look up a wrangler.
    pub fn resolve(&self, code: &str) -> Result<Arc<dyn Wrangler>> {
        self.wranglers.get(code).cloned().ok_or_else(|| {
            warn!("Wrangler '{}' is not registered", code);
            ScourError::PluginResolution {
                kind: "wrangler",
                name: code.to_string(),
            }
        })
    }
}

impl std::fmt::Debug for WranglerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WranglerRegistry")
            .field("wranglers", &self.wranglers.keys().collect::<Vec<_>>())
            .finish()
    }
}
