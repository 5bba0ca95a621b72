//! Renders a provenance log as a pandas script.
//!
//! Rows are matched by the literal x(/y) values recorded with each action,
//! not by ID, because the script runs against the original file. When
//! several rows share the recorded values, all of them match: a removal or
//! imputation can therefore touch more rows in the script than it did in the
//! session.

use std::path::Path;

use indexmap::IndexMap;

use crate::table::{Value, format_number};

use super::record::{TransformationKind, TransformationRecord};

/// File families the script knows how to read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFamily {
    Csv,
    Tsv,
    Json,
    Excel,
}

impl FileFamily {
    fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "tsv" | "tab" => FileFamily::Tsv,
            "json" => FileFamily::Json,
            "xlsx" | "xls" => FileFamily::Excel,
            _ => FileFamily::Csv,
        }
    }

    fn read(&self, file: &str) -> String {
        let file = python_string(file);
        match self {
            FileFamily::Csv => format!("pd.read_csv({})", file),
            FileFamily::Tsv => format!("pd.read_csv({}, sep=\"\\t\")", file),
            FileFamily::Json => format!("pd.read_json({})", file),
            FileFamily::Excel => format!("pd.read_excel({})", file),
        }
    }

    fn write(&self, file: &str) -> String {
        let file = python_string(file);
        match self {
            FileFamily::Csv => format!("df.to_csv({}, index=False)", file),
            FileFamily::Tsv => format!("df.to_csv({}, sep=\"\\t\", index=False)", file),
            FileFamily::Json => format!("df.to_json({}, orient=\"records\")", file),
            FileFamily::Excel => format!("df.to_excel({}, index=False)", file),
        }
    }
}

/// Builds the replay script for one original file.
#[derive(Debug, Clone)]
pub struct ScriptExporter {
    original_filename: String,
    row_count: usize,
}

impl ScriptExporter {
    /// `row_count` is the number of rows the session loaded.
    pub fn new(original_filename: impl Into<String>, row_count: usize) -> Self {
        Self {
            original_filename: original_filename.into(),
            row_count,
        }
    }

    /// `<basename>_cleaned.<ext>` next to the original name.
    pub fn cleaned_filename(&self) -> String {
        let path = Path::new(&self.original_filename);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "data".to_string());
        let ext = path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "csv".to_string());
        format!("{}_cleaned.{}", stem, ext)
    }

    fn family(&self) -> FileFamily {
        Path::new(&self.original_filename)
            .extension()
            .map(|ext| FileFamily::from_extension(&ext.to_string_lossy()))
            .unwrap_or(FileFamily::Csv)
    }

    /// Render the whole script. Output depends only on the log contents.
    pub fn render(&self, log: &[TransformationRecord]) -> String {
        let family = self.family();
        let mut lines = vec![
            "import pandas as pd".to_string(),
            String::new(),
            format!("df = {}", family.read(&self.original_filename)),
            format!("df = df.head({})", self.row_count),
            String::new(),
        ];

        for (idx, record) in log.iter().enumerate() {
            lines.push(format!("# {}. {}", idx + 1, record.description()));
            lines.push(render_statement(record));
            lines.push(String::new());
        }

        lines.push(family.write(&self.cleaned_filename()));
        let mut script = lines.join("\n");
        script.push('\n');
        script
    }
}

fn render_statement(record: &TransformationRecord) -> String {
    let condition = render_condition(record);
    match record.kind {
        TransformationKind::Remove => format!("df = df[~({})]", condition),
        TransformationKind::Transform => {
            let value = record
                .imputed_value
                .as_ref()
                .map(python_literal)
                .unwrap_or_else(|| "pd.NA".to_string());
            format!(
                "df.loc[{}, {}] = {}",
                condition,
                python_string(record.target_column()),
                value
            )
        }
    }
}

/// OR over the distinct recorded (x[, y]) pairs.
fn render_condition(record: &TransformationRecord) -> String {
    let mut pairs: IndexMap<String, (&Value, Option<&Value>)> = IndexMap::new();
    for (idx, x) in record.x_values.iter().enumerate() {
        let y = match (&record.y_column, &record.y_values) {
            (Some(_), Some(values)) => values.get(idx),
            _ => None,
        };
        let key = match y {
            Some(y) => format!("{}|{}", x.dedup_key(), y.dedup_key()),
            None => x.dedup_key(),
        };
        pairs.entry(key).or_insert((x, y));
    }

    if pairs.is_empty() {
        return "pd.Series(False, index=df.index)".to_string();
    }

    pairs
        .values()
        .map(|(x, y)| {
            let x_test = equality_test(&record.x_column, x);
            match (y, &record.y_column) {
                (Some(y), Some(y_column)) => {
                    format!("(({}) & ({}))", x_test, equality_test(y_column, y))
                }
                _ => format!("({})", x_test),
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn equality_test(column: &str, value: &Value) -> String {
    let column = format!("df[{}]", python_string(column));
    if value.is_null_like() {
        format!("{}.isna()", column)
    } else {
        format!("{} == {}", column, python_literal(value))
    }
}

fn python_literal(value: &Value) -> String {
    match value {
        Value::Number(n) if n.is_nan() => "float(\"nan\")".to_string(),
        Value::Number(n) if n.is_infinite() => {
            if *n > 0.0 {
                "float(\"inf\")".to_string()
            } else {
                "-float(\"inf\")".to_string()
            }
        }
        Value::Number(n) => format_number(*n),
        Value::Text(s) => python_string(s),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
    }
}

fn python_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
