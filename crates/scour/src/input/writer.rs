//! Writes a working table back to disk.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use indexmap::IndexMap;
use tracing::info;

use crate::error::{Result, ScourError};
use crate::table::{Table, Value};

use super::source::DataFormat;

/// Write `table` to `path`, choosing the format from the extension.
pub fn write_table(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = DataFormat::from_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                ScourError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(path).map_err(|e| {
        ScourError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
    })?;
    let writer = BufWriter::new(file);

    match format {
        DataFormat::Csv => write_delimited(table, writer, b',')?,
        DataFormat::Tsv => write_delimited(table, writer, b'\t')?,
        DataFormat::Json => {
            let records: Vec<IndexMap<&str, &Value>> = table
                .rows()
                .iter()
                .map(|row| {
                    table
                        .columns()
                        .iter()
                        .map(|c| (c.as_str(), row.value(c)))
                        .collect()
                })
                .collect();
            serde_json::to_writer_pretty(writer, &records).map_err(|e| {
                ScourError::Persistence(format!("Failed to serialize table: {}", e))
            })?;
        }
    }

    info!(
        "Wrote {} rows to {} ({})",
        table.row_count(),
        path.display(),
        format
    );
    Ok(())
}

fn write_delimited<W: std::io::Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(table.columns().iter().map(|c| row.value(c).to_string()))?;
    }
    writer.flush().map_err(|e| {
        ScourError::Persistence(format!("Failed to flush table: {}", e))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;
    use crate::table::ingest;
    use tempfile::TempDir;

    fn table() -> Table {
        ingest(
            vec!["name".to_string(), "age".to_string()],
            vec![
                vec!["Ann, Jr.".into(), Value::Number(30.0)],
                vec![Value::Null, Value::Number(4.5)],
            ],
        )
    }

    #[test]
    fn test_csv_written_and_reread() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&table(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ID,name,age\n1,\"Ann, Jr.\",30\n2,,4.5"));

        let (reread, _) = Parser::new().parse_file(&path).unwrap();
        assert_eq!(reread.row(1).unwrap().value("name"), &Value::Text("Ann, Jr.".to_string()));
        assert_eq!(reread.row(2).unwrap().value("name"), &Value::Null);
    }

    #[test]
    fn test_json_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sub").join("out.json");
        write_table(&table(), &path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed[0]["name"], "Ann, Jr.");
        assert_eq!(parsed[1]["name"], serde_json::Value::Null);
        assert_eq!(parsed[1]["ID"], 2.0);
    }
}
