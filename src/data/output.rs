use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use super::Table;
use crate::error::{Error, Result};

/// Serializes a whole table into memory, one `\n`-terminated record per row.
///
/// Fields are quoted only when they contain the delimiter, a quote or a line break.
pub fn render(table: &Table, delimiter: u8) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush().map_err(|err| Error::io("<buffer>", err))?;

    wtr.into_inner().map_err(|err| {
        Error::io(
            "<buffer>",
            std::io::Error::new(err.error().kind(), err.to_string()),
        )
    })
}

/// Writes the table to every destination.
///
/// Each destination is first written to a temporary file next to it; the
/// temporary files are only moved into place once all of them were written,
/// so a failing destination leaves no output behind.
pub fn write_files(table: &Table, destinations: &[PathBuf], delimiter: u8) -> Result<()> {
    let bytes = render(table, delimiter)?;

    let mut staged = Vec::with_capacity(destinations.len());
    for path in destinations {
        staged.push(stage(path, &bytes)?);
    }

    for (file, path) in staged.into_iter().zip(destinations) {
        file.persist(path).map_err(|err| Error::io(path, err.error))?;
        info!("Wrote {} rows to {:?}", table.len(), path);
    }
    Ok(())
}

fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(|err| Error::io(path, err))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|err| Error::io(path, err))?;
    Ok(file)
}

pub fn write_stdout(table: &Table, delimiter: u8) -> Result<()> {
    let bytes = render(table, delimiter)?;
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    lock.write_all(&bytes)
        .and_then(|_| lock.flush())
        .map_err(|err| Error::io("<stdout>", err))
}
