use std::collections::BTreeSet;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Value that selects no column at all.
pub const NO_COLUMN: i64 = -1;

/// A column reference: a 0-based index, a spreadsheet letter label or the no-op sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSelector {
    Index(usize),
    NoOp,
}

impl FromStr for ColumnSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim();
        let invalid = || Error::InvalidColumnLabel {
            label: s.to_string(),
        };

        if let Ok(number) = label.parse::<i64>() {
            return match number {
                NO_COLUMN => Ok(ColumnSelector::NoOp),
                n if n >= 0 => usize::try_from(n)
                    .map(ColumnSelector::Index)
                    .map_err(|_| invalid()),
                _ => Err(invalid()),
            };
        }

        letters_to_index(label)
            .map(ColumnSelector::Index)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for ColumnSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSelector::Index(idx) => write!(f, "{} ({})", index_to_letters(*idx), idx),
            ColumnSelector::NoOp => write!(f, "{}", NO_COLUMN),
        }
    }
}

/// Converts a spreadsheet column label to a 0-based index: A=0, Z=25, AA=26.
///
/// Labels are case-insensitive. Returns `None` for an empty label, a label
/// containing anything but ASCII letters, or one too large for `usize`.
pub fn letters_to_index(label: &str) -> Option<usize> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }

    let number = label.bytes().try_fold(0usize, |acc, b| {
        let digit = (b.to_ascii_uppercase() - b'A') as usize + 1;
        acc.checked_mul(26)?.checked_add(digit)
    })?;

    Some(number - 1)
}

/// Converts a 0-based index back to its spreadsheet column label.
pub fn index_to_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A column entry as written in the config file: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnEntry {
    Number(i64),
    Label(String),
}

impl ColumnEntry {
    pub fn resolve(&self) -> Result<ColumnSelector> {
        match self {
            ColumnEntry::Number(n) => n.to_string().parse(),
            ColumnEntry::Label(label) => label.parse(),
        }
    }
}

impl From<i64> for ColumnEntry {
    fn from(n: i64) -> Self {
        ColumnEntry::Number(n)
    }
}

/// Resolves every entry to a column index, dropping no-op entries.
pub fn resolve_all<'a, I>(entries: I) -> Result<BTreeSet<usize>>
where
    I: IntoIterator<Item = &'a ColumnEntry>,
{
    let mut columns = BTreeSet::new();
    for entry in entries {
        match entry.resolve()? {
            ColumnSelector::Index(idx) => {
                columns.insert(idx);
            }
            ColumnSelector::NoOp => debug!("Skipping no-op column entry {:?}", entry),
        }
    }
    Ok(columns)
}

/// Splits a comma-separated command line list such as `C,AA,3` into entries.
pub fn parse_list(list: &str) -> Vec<ColumnEntry> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| ColumnEntry::Label(item.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;

    #[test]
    fn letter_labels() {
        assert_eq!(letters_to_index("A"), Some(0));
        assert_eq!(letters_to_index("B"), Some(1));
        assert_eq!(letters_to_index("Z"), Some(25));
        assert_eq!(letters_to_index("AA"), Some(26));
        assert_eq!(letters_to_index("AZ"), Some(51));
        assert_eq!(letters_to_index("BA"), Some(52));
        assert_eq!(letters_to_index("VP"), Some(587));
    }

    #[test]
    fn letter_labels_ignore_case() {
        assert_eq!(letters_to_index("aa"), Some(26));
        assert_eq!(letters_to_index("vP"), letters_to_index("VP"));
    }

    #[test]
    fn letter_labels_reject_garbage() {
        assert_eq!(letters_to_index(""), None);
        assert_eq!(letters_to_index("A1"), None);
        assert_eq!(letters_to_index("Ä"), None);
        assert_eq!(letters_to_index(&"Z".repeat(40)), None);
    }

    #[test]
    fn index_to_letters_inverts_labels() {
        for idx in [0, 1, 25, 26, 51, 52, 587, 701, 702, 18277] {
            assert_eq!(letters_to_index(&index_to_letters(idx)), Some(idx));
        }
        assert_eq!(index_to_letters(26), "AA");
    }

    #[test]
    fn selectors_from_strings() {
        assert_eq!("3".parse::<ColumnSelector>().unwrap(), ColumnSelector::Index(3));
        assert_eq!(" C ".parse::<ColumnSelector>().unwrap(), ColumnSelector::Index(2));
        assert_eq!("-1".parse::<ColumnSelector>().unwrap(), ColumnSelector::NoOp);
    }

    #[test]
    fn invalid_selectors_name_the_label() {
        for label in ["-2", "C3", "", "1.5", "#"] {
            let err = label.parse::<ColumnSelector>().unwrap_err();
            assert!(
                matches!(&err, Error::InvalidColumnLabel { label: l } if l == label),
                "unexpected error for {:?}: {}",
                label,
                err
            );
        }
    }

    #[test]
    fn config_entries_deserialize_from_numbers_and_strings() {
        let entries: Vec<ColumnEntry> = serde_json::from_str(r#"[-1, 2, "C", "AA", "7"]"#).unwrap();
        let columns = resolve_all(&entries).unwrap();

        assert_eq!(columns.into_iter().collect::<Vec<_>>(), vec![2, 7, 26]);
    }

    #[test]
    fn resolve_all_reports_first_bad_entry() {
        let entries = vec![ColumnEntry::from(1), ColumnEntry::Label("B?".to_string())];

        assert_that(&resolve_all(&entries).is_err()).is_true();
    }

    #[test]
    fn command_line_lists() {
        let entries = parse_list("C, AA,,3");

        assert_that(&entries).has_length(3);
        assert_eq!(
            resolve_all(&entries).unwrap().into_iter().collect::<Vec<_>>(),
            vec![2, 3, 26]
        );
    }

    #[test]
    fn selector_display_shows_label_and_index() {
        assert_eq!(ColumnSelector::Index(26).to_string(), "AA (26)");
        assert_eq!(ColumnSelector::NoOp.to_string(), "-1");
    }
}
