//! Ingestion: turn raw rows into a [`Table`] that satisfies the ID invariant.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, info};

use super::data::{ID_COLUMN, Row, RowId, Table};
use super::value::Value;

/// Name under which a non-conforming pre-existing `ID` column is preserved.
pub const ID_BACKUP_COLUMN: &str = "ID_original";

/// Build a table from a header row and positional rows.
///
/// Short rows are padded with `Null`; extra cells are dropped.
pub fn ingest(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Table {
    let records = rows
        .into_iter()
        .map(|row| {
            let mut cells = row.into_iter();
            headers
                .iter()
                .map(|h| (h.clone(), cells.next().unwrap_or(Value::Null)))
                .collect::<IndexMap<_, _>>()
        })
        .collect();
    ingest_records(headers, records)
}

/// Build a table from keyed records, assigning or repairing row IDs.
///
/// Repeated header names collapse into one column.
///
/// An existing `ID` column is kept when every value is a non-negative
/// integral number and no value repeats. Otherwise IDs are assigned
/// sequentially from 1 and the old column survives under
/// [`ID_BACKUP_COLUMN`] (suffixed if that name is taken).
pub fn ingest_records(headers: Vec<String>, records: Vec<IndexMap<String, Value>>) -> Table {
    let has_id = headers.iter().any(|h| h == ID_COLUMN);

    let existing_ids = if has_id {
        conforming_ids(&records)
    } else {
        None
    };

    let backup = if has_id && existing_ids.is_none() {
        let name = backup_name(&headers);
        info!(
            "Existing '{}' column is not a unique integer key; preserving it as '{}'",
            ID_COLUMN, name
        );
        Some(name)
    } else {
        None
    };

    let mut columns = vec![ID_COLUMN.to_string()];
    for header in &headers {
        if header == ID_COLUMN {
            if let Some(ref name) = backup {
                columns.push(name.clone());
            }
        } else if !columns.contains(header) {
            columns.push(header.clone());
        }
    }

    let rows: Vec<Row> = records
        .into_iter()
        .enumerate()
        .map(|(idx, mut record)| {
            let id = match existing_ids {
                Some(ref ids) => ids[idx],
                None => idx as RowId + 1,
            };

            let old_id = record.shift_remove(ID_COLUMN);
            let mut cells = IndexMap::with_capacity(columns.len());
            cells.insert(ID_COLUMN.to_string(), Value::Number(id as f64));
            for column in columns.iter().skip(1) {
                let value = if Some(column) == backup.as_ref() {
                    old_id.clone().unwrap_or(Value::Null)
                } else {
                    record.shift_remove(column).unwrap_or(Value::Null)
                };
                cells.insert(column.clone(), value);
            }
            Row::new(id, cells)
        })
        .collect();

    debug!("Ingested {} rows x {} columns", rows.len(), columns.len());
    Table::from_parts(columns, rows)
}

/// The existing IDs, if they form a unique non-negative integer key.
fn conforming_ids(records: &[IndexMap<String, Value>]) -> Option<Vec<RowId>> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut ids = Vec::with_capacity(records.len());

    for record in records {
        let id = match record.get(ID_COLUMN) {
            Some(Value::Number(n)) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
                *n as RowId
            }
            _ => return None,
        };
        if !seen.insert(id) {
            return None;
        }
        ids.push(id);
    }

    Some(ids)
}

fn backup_name(headers: &[String]) -> String {
    let taken = |name: &str| headers.iter().any(|h| h == name);
    if !taken(ID_BACKUP_COLUMN) {
        return ID_BACKUP_COLUMN.to_string();
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", ID_BACKUP_COLUMN, suffix);
        if !taken(&candidate) {
            return candidate;
        }
        suffix += 1;
    }
}
