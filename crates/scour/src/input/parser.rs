//! CSV/TSV/JSON parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Result, ScourError};
use crate::table::{Table, Value, ingest, ingest_records};

use super::source::{DataFormat, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

impl ParserConfig {
    /// Force a delimiter instead of detecting one.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Stop after `max_rows` data rows.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Treat the first row as data and name columns `column_1..`.
    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }
}

/// Parses tabular data files into a [`Table`].
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the table and metadata.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();
        let format = DataFormat::from_path(path)?;

        let mut file = File::open(path).map_err(|e| ScourError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let size_bytes = file
            .metadata()
            .map_err(|e| ScourError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| ScourError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (table, format_label) = match format {
            DataFormat::Json => (self.parse_json(&contents)?, "json".to_string()),
            DataFormat::Tsv | DataFormat::Csv => {
                let delimiter = match (self.config.delimiter, format) {
                    (Some(d), _) => d,
                    (None, DataFormat::Tsv) => b'\t',
                    (None, _) => detect_delimiter(&contents)?,
                };
                let label = match delimiter {
                    b'\t' => "tsv",
                    b',' => "csv",
                    b';' => "csv-semicolon",
                    b'|' => "psv",
                    _ => "delimited",
                };
                (self.parse_bytes(&contents, delimiter)?, label.to_string())
            }
        };

        // The ID column is added on ingest; report the columns as read.
        let column_count = table.data_columns().count();
        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format_label,
            table.row_count(),
            column_count,
        );

        info!(
            "Loaded {} ({} rows, {} columns, {})",
            metadata.file, metadata.row_count, metadata.column_count, metadata.format
        );

        Ok((table, metadata))
    }

    /// Parse delimited bytes.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut pending = None;
        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => {
                    let names = (0..record.len())
                        .map(|i| format!("column_{}", i + 1))
                        .collect();
                    pending = Some(record);
                    names
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ScourError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(ScourError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        let first = pending.map(Ok);
        for result in first.into_iter().chain(reader.records()) {
            if let Some(max) = self.config.max_rows {
                if rows.len() >= max {
                    break;
                }
            }

            let record = result?;
            // Short rows are padded with Null on ingest; extra cells are dropped.
            let row: Vec<Value> = record
                .iter()
                .take(headers.len())
                .map(Value::parse_cell)
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ScourError::EmptyData("No data rows found".to_string()));
        }

        debug!(
            "Parsed {} rows with delimiter {:?}",
            rows.len(),
            delimiter as char
        );
        Ok(ingest(headers, rows))
    }

    /// Parse a JSON array of objects.
    ///
    /// Columns are the union of object keys in first-seen order; absent keys
    /// read as `Null`.
    pub fn parse_json(&self, bytes: &[u8]) -> Result<Table> {
        let parsed: serde_json::Value = serde_json::from_slice(bytes)?;
        let items = match parsed {
            serde_json::Value::Array(items) => items,
            _ => {
                return Err(ScourError::UnsupportedFormat(
                    "JSON input must be an array of objects".to_string(),
                ));
            }
        };

        let mut headers: Vec<String> = Vec::new();
        let mut records: Vec<IndexMap<String, Value>> = Vec::with_capacity(items.len());

        for item in items {
            if let Some(max) = self.config.max_rows {
                if records.len() >= max {
                    break;
                }
            }

            let serde_json::Value::Object(object) = item else {
                return Err(ScourError::UnsupportedFormat(
                    "JSON input must be an array of objects".to_string(),
                ));
            };

            let mut record = IndexMap::with_capacity(object.len());
            for (key, value) in &object {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
                record.insert(key.clone(), Value::from_json(value));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(ScourError::EmptyData("No data rows found".to_string()));
        }
        if headers.is_empty() {
            return Err(ScourError::EmptyData("No columns found".to_string()));
        }

        let count = records.len();
        let records = records
            .into_iter()
            .map(|mut record| {
                for header in &headers {
                    record.entry(header.clone()).or_insert(Value::Null);
                }
                record
            })
            .collect();

        debug!("Parsed {} JSON records", count);
        Ok(ingest_records(headers, records))
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ScourError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts
                .iter()
                .map(|&c| (c as f64 - mean).powi(2))
                .sum::<f64>()
                / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tabs get a small bonus.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
