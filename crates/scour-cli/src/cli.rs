//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scour: detect, inspect and clean errors in tabular data
#[derive(Parser)]
#[command(name = "scour")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the detectors and report flagged cells
    Detect {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output the full error map as JSON
        #[arg(long)]
        json: bool,

        /// Session configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a hybrid histogram (or a 2D grid with --y) as JSON
    Histogram {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Column for the x axis
        #[arg(short, long)]
        x: String,

        /// Column for the y axis
        #[arg(short, long)]
        y: Option<String>,

        /// Number of numeric bins per axis
        #[arg(short, long)]
        bins: Option<usize>,

        /// Session configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a cleaning plan and write the cleaned table, script and log
    Clean {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Cleaning plan: a JSON list of steps
        #[arg(short, long)]
        plan: PathBuf,

        /// Output path for the cleaned table (default: <file>_cleaned.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output path for the pandas script (default: <file>_cleaned.py)
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Output path for the provenance log (default: <file>.provenance.json)
        #[arg(short, long)]
        log: Option<PathBuf>,

        /// Session configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
