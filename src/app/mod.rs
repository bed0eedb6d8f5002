use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::Settings;
use crate::data::{output, parse, OutputTarget, Table};
use crate::error::Result;
use crate::expand;

/// Reads the input, expands it and hands the result to the output stage.
///
/// The whole table is read and expanded before anything is written, so a
/// failure leaves no partial output behind.
pub fn run(
    settings: &Settings,
    input: &Path,
    target: OutputTarget,
    destinations: &[PathBuf],
) -> Result<Table> {
    let table = if input == Path::new("-") {
        parse::parse_stdin(settings.delimiter)?
    } else {
        parse::read_path(input, settings.delimiter)?
    };
    info!(
        "Parsed table: {} rows, {} columns",
        table.len(),
        table.num_columns()
    );

    let expanded = expand::expand(&table, &settings.expand);
    info!("Expanded into {} rows", expanded.len());

    match target {
        OutputTarget::Stdout => output::write_stdout(&expanded, settings.delimiter)?,
        OutputTarget::Files => output::write_files(&expanded, destinations, settings.delimiter)?,
    }

    Ok(expanded)
}
