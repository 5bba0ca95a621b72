//! Histogram command - print a 1D histogram or 2D grid as JSON.

use std::path::PathBuf;

use scour::Session;

use super::{load_config, require_file};

pub fn run(
    file: PathBuf,
    x: String,
    y: Option<String>,
    bins: Option<usize>,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_file(&file)?;
    let mut config = load_config(config.as_deref())?;
    if let Some(bins) = bins {
        config.binning = config.binning.with_bin_count(bins);
    }

    let session = Session::open(&file, config)?;

    let json = match y {
        Some(y) => serde_json::to_string_pretty(&session.grid(&x, &y)?)?,
        None => serde_json::to_string_pretty(&session.histogram(&x)?)?,
    };
    println!("{}", json);

    Ok(())
}
