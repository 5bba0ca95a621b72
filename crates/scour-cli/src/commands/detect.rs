//! Detect command - run the detectors and report flagged cells.

use std::path::PathBuf;

use colored::Colorize;
use scour::{ErrorKind, Session};

use super::{load_config, require_file};

pub fn run(
    file: PathBuf,
    json_output: bool,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;
    let config = load_config(config.as_deref())?;
    let session = Session::open(&file, config)?;

    if json_output {
        let report = serde_json::json!({
            "summary": session.summary(),
            "errors": session.error_map(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let summary = session.summary();
    println!(
        "{} {} ({} rows, {} columns)",
        "Detected errors in".cyan().bold(),
        file.display().to_string().white(),
        summary.current_rows,
        summary.columns
    );
    println!();

    if session.error_map().is_empty() {
        println!("{}", "No errors found.".green());
        return Ok(());
    }

    println!(
        "  {:24} {:>8} {:>10} {:>8} {:>11}",
        "Column".bold(),
        "missing".bold(),
        "mismatch".bold(),
        "anomaly".bold(),
        "incomplete".bold()
    );
    for (column, counts) in session.error_map().summary() {
        let count = |kind: ErrorKind| counts.get(&kind).copied().unwrap_or(0);
        println!(
            "  {:24} {:>8} {:>10} {:>8} {:>11}",
            column,
            dash_if_zero(count(ErrorKind::Missing)).red(),
            dash_if_zero(count(ErrorKind::Mismatch)).yellow(),
            dash_if_zero(count(ErrorKind::Anomaly)).magenta(),
            dash_if_zero(count(ErrorKind::Incomplete)).blue()
        );

        if verbose {
            if let Some(rows) = session.error_map().column(&column) {
                let ids: Vec<String> = rows.keys().map(|id| id.to_string()).collect();
                println!("    rows: {}", ids.join(", ").dimmed());
            }
        }
    }
    println!();

    println!(
        "Flagged {} cells in {} columns",
        summary.flagged_cells.to_string().white().bold(),
        summary.columns_with_errors.to_string().white().bold()
    );

    Ok(())
}

fn dash_if_zero(count: usize) -> String {
    if count == 0 {
        "-".to_string()
    } else {
        count.to_string()
    }
}
