use std::io::{self, IsTerminal, Read};
use std::path::Path;

use tracing::{debug, warn};

use super::Table;
use crate::error::{Error, Result};

/// Read from stdin and parse into a Table.
pub fn parse_stdin(delimiter: u8) -> Result<Table> {
    if io::stdin().is_terminal() {
        return Err(Error::io(
            "<stdin>",
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "no input provided; pipe data into slashsplit or pass a file",
            ),
        ));
    }
    parse_reader(io::stdin().lock(), Path::new("<stdin>"), delimiter)
}

/// Read a delimited file from disk and parse into a Table.
pub fn read_path(path: &Path, delimiter: u8) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|err| Error::io(path, err))?;
    parse_reader(file, path, delimiter)
}

/// Reads everything from `reader` and parses it. `source` names the input in
/// errors and log messages.
pub fn parse_reader<R: Read>(mut reader: R, source: &Path, delimiter: u8) -> Result<Table> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| Error::io(source, err))?;
    debug!("Read {} bytes from {:?}", bytes.len(), source);

    let input = decode(&bytes, source);
    parse_string(&input, delimiter)
}

/// Decodes input as UTF-8, replacing invalid sequences with U+FFFD.
fn decode<'a>(bytes: &'a [u8], source: &Path) -> std::borrow::Cow<'a, str> {
    let input = String::from_utf8_lossy(bytes);
    if let std::borrow::Cow::Owned(_) = input {
        warn!(
            "{:?} is not valid UTF-8; invalid bytes were replaced with U+FFFD",
            source
        );
    }
    input
}

/// Parse a string into a Table (testable core).
///
/// Every record is data, including the first one. Records are read flexibly
/// so that a ragged table is reported by [`Table::from_rows`] with its row index.
pub fn parse_string(input: &str, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    Table::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn csv_rows_are_all_data() {
        let input = "name,age\nAlice,30\nBob,25";
        let table = parse_string(input, b',').unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], vec!["name", "age"]);
        assert_eq!(table.rows()[1], vec!["Alice", "30"]);
        assert_eq!(table.rows()[2], vec!["Bob", "25"]);
    }

    #[test]
    fn csv_empty() {
        let table = parse_string("", b',').unwrap();

        assert!(table.is_empty());
    }

    #[test]
    fn csv_slashes_are_kept_in_fields() {
        let input = "AAA,BBB,LLL/MMM/NNN,CCC\n";
        let table = parse_string(input, b',').unwrap();

        assert_eq!(table.rows()[0], vec!["AAA", "BBB", "LLL/MMM/NNN", "CCC"]);
    }

    #[test]
    fn csv_quoted_fields_with_commas_and_newlines() {
        let input = "Alice,\"likes cats, dogs\"\nBob,\"line1\nline2\"";
        let table = parse_string(input, b',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0], vec!["Alice", "likes cats, dogs"]);
        assert_eq!(table.rows()[1], vec!["Bob", "line1\nline2"]);
    }

    #[test]
    fn csv_custom_delimiter() {
        let input = "a;b/c\nd;e";
        let table = parse_string(input, b';').unwrap();

        assert_eq!(table.rows()[0], vec!["a", "b/c"]);
        assert_eq!(table.rows()[1], vec!["d", "e"]);
    }

    #[test]
    fn csv_ragged_rows_rejected() {
        let input = "a,b,c\n1,2\n3,4,5";
        let err = parse_string(input, b',').unwrap_err();

        assert!(matches!(
            err,
            Error::RaggedTable {
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn read_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let err = read_path(&path, b',').unwrap_err();

        assert!(err.to_string().contains("missing.csv"));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.csv");
        std::fs::write(&path, b"caf\xe9,a/b\n").unwrap();

        let table = read_path(&path, b',').unwrap();
        assert_eq!(table.rows()[0], vec!["caf\u{FFFD}", "a/b"]);
    }

    #[test]
    fn reader_input_is_parsed_like_a_file() {
        let input = io::Cursor::new(b"a,b/c\nd,e\n".to_vec());
        let table = parse_reader(input, Path::new("<stdin>"), b',').unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1], vec!["d", "e"]);
    }

    #[test]
    fn read_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        std::fs::write(&path, "x,y/z\n").unwrap();

        let table = read_path(&path, b',').unwrap();
        assert_eq!(table.rows()[0], vec!["x", "y/z"]);
    }
}
