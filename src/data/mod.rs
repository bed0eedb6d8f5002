use crate::error::{Error, Result};

pub mod output;
pub mod parse;

pub type Row = Vec<String>;

/// A rectangular table: every row has the same number of fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table, rejecting rows whose field count differs from the first row.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        if let Some(expected) = rows.first().map(Vec::len) {
            if let Some((row, found)) = rows
                .iter()
                .map(Vec::len)
                .enumerate()
                .find(|(_, len)| *len != expected)
            {
                return Err(Error::RaggedTable {
                    row,
                    expected,
                    found,
                });
            }
        }

        Ok(Table { rows })
    }

    /// Wraps rows already known to share one field count.
    pub(crate) fn from_rectangular(rows: Vec<Row>) -> Self {
        debug_assert!(rows.windows(2).all(|pair| pair[0].len() == pair[1].len()));
        Table { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of fields per row, 0 for an empty table.
    pub fn num_columns(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTarget {
    Files,
    Stdout,
}
