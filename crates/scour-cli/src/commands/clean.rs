//! Clean command - replay a cleaning plan against a session.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Deserialize;
use scour::history::provenance_path;
use scour::table::RowId;
use scour::{ErrorKind, Session};

use super::{load_config, require_file};

/// One step of a cleaning plan.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanStep {
    /// Select rows by ID, by 1D bin index (numeric bins first), or by error
    /// kind in a column.
    Select {
        #[serde(default)]
        ids: Vec<RowId>,
        column: Option<String>,
        bin: Option<usize>,
        #[serde(default)]
        errors: Vec<ErrorKind>,
    },
    /// Remove the selected rows.
    Remove { x: String, y: Option<String> },
    /// Apply a registered wrangler to the selection.
    Wrangle {
        wrangler: String,
        x: String,
        y: Option<String>,
    },
    Undo,
    Redo,
}

pub fn run(
    file: PathBuf,
    plan: PathBuf,
    output: Option<PathBuf>,
    script: Option<PathBuf>,
    log: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;
    require_file(&plan)?;
    let config = load_config(config.as_deref())?;

    let steps: Vec<PlanStep> = serde_json::from_reader(BufReader::new(File::open(&plan)?))
        .map_err(|e| format!("Invalid plan '{}': {}", plan.display(), e))?;

    println!(
        "{} {} ({} steps)",
        "Cleaning".cyan().bold(),
        file.display().to_string().white(),
        steps.len()
    );

    let mut session = Session::open(&file, config)?;
    for (idx, step) in steps.iter().enumerate() {
        let label = apply_step(&mut session, step)?;
        println!("  {:>3}. {}", idx + 1, label);
    }

    let output = output.unwrap_or_else(|| sibling(&file, "_cleaned", None));
    let script = script.unwrap_or_else(|| sibling(&file, "_cleaned", Some("py")));
    let log = log.unwrap_or_else(|| provenance_path(&file));

    session.save_cleaned(&output)?;
    session.save_script(&script)?;
    session.save_log(&log)?;

    let summary = session.summary();
    println!();
    println!(
        "Rows: {} -> {}   Remaining flagged cells: {}",
        summary.original_rows.to_string().white(),
        summary.current_rows.to_string().white().bold(),
        summary.flagged_cells.to_string().yellow()
    );
    println!("  {} {}", "Table: ".green(), output.display());
    println!("  {} {}", "Script:".green(), script.display());
    println!("  {} {}", "Log:   ".green(), log.display());

    Ok(())
}

fn apply_step(session: &mut Session, step: &PlanStep) -> Result<String, Box<dyn std::error::Error>> {
    let label = match step {
        PlanStep::Select {
            ids,
            column,
            bin,
            errors,
        } => {
            let selection = match (column, bin) {
                (Some(column), Some(bin)) => {
                    let histogram = session.histogram(column)?;
                    histogram
                        .bins()
                        .nth(*bin)
                        .map(|b| b.ids.clone())
                        .ok_or_else(|| format!("Column '{}' has no bin {}", column, bin))?
                }
                (Some(column), None) if !errors.is_empty() => session
                    .table()
                    .ids()
                    .filter(|&id| {
                        session
                            .error_map()
                            .kinds(column, id)
                            .iter()
                            .any(|k| errors.contains(k))
                    })
                    .collect(),
                _ => ids.clone(),
            };
            let count = selection.len();
            session.select(selection);
            format!("Selected {} row(s)", count)
        }
        PlanStep::Remove { x, y } => {
            let count = session.selection().len();
            session.apply_wrangler("remove_selected", x, y.as_deref())?;
            format!("Removed {} row(s)", count.to_string().red())
        }
        PlanStep::Wrangle { wrangler, x, y } => {
            let count = session.selection().len();
            session.apply_wrangler(wrangler, x, y.as_deref())?;
            format!("{} on {} row(s) of '{}'", wrangler.blue(), count, x)
        }
        PlanStep::Undo => {
            if session.undo()? {
                "Undo".to_string()
            } else {
                "Undo (nothing to undo)".dimmed().to_string()
            }
        }
        PlanStep::Redo => {
            if session.redo()? {
                "Redo".to_string()
            } else {
                "Redo (nothing to redo)".dimmed().to_string()
            }
        }
    };
    Ok(label)
}

/// `dir/<stem><suffix>.<ext>`, keeping the input extension when `ext` is None.
fn sibling(file: &Path, suffix: &str, ext: Option<&str>) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let ext = ext
        .map(str::to_string)
        .or_else(|| file.extension().map(|e| e.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "csv".to_string());
    file.with_file_name(format!("{}{}.{}", stem, suffix, ext))
}
