use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("row {row} has {found} fields, expected {expected} like the first row")]
    RaggedTable {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid column label {label:?}: expected a 0-based number or letters like A, Z, AA")]
    InvalidColumnLabel { label: String },

    #[error("invalid separator {value:?}: expected exactly one character")]
    InvalidSeparator { value: String },

    #[error("invalid delimiter {value:?}: expected exactly one ASCII character")]
    InvalidDelimiter { value: String },

    #[error("config {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
