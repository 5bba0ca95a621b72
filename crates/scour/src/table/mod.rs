//! Table abstraction: typed cell values, rows keyed by a stable ID, and
//! ingestion that enforces the ID invariant.

mod data;
mod ingest;
mod value;

pub use data::{ID_COLUMN, Row, RowId, Table};
pub use ingest::{ID_BACKUP_COLUMN, ingest, ingest_records};
pub use value::{NAN_LABEL, Value, ValueKind, format_number};
