//! Scour CLI - tabular data cleaning from the command line.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Log to stderr so JSON on stdout stays clean. `RUST_LOG` wins.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Detect { file, json, config } => {
            commands::detect::run(file, json, config, cli.verbose)
        }

        Commands::Histogram {
            file,
            x,
            y,
            bins,
            config,
        } => commands::histogram::run(file, x, y, bins, config),

        Commands::Clean {
            file,
            plan,
            output,
            script,
            log,
            config,
        } => commands::clean::run(file, plan, output, script, log, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
