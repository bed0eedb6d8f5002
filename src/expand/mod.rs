//! The row expander.
//!
//! Every source row becomes one or more output rows. Cells of the explode
//! columns are split on the separator and each fragment lands on its own row;
//! bring-down columns repeat their original value on rows where they have no
//! fragment of their own.

use std::collections::BTreeSet;

use tracing::debug;

use crate::data::{Row, Table};

pub const DEFAULT_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    pub explode: BTreeSet<usize>,
    pub bring_down: BTreeSet<usize>,
    /// Keep every source row as-is and insert the exploded rows below it,
    /// instead of replacing it with the exploded rows.
    pub preserve_original_row: bool,
    pub separator: char,
    /// Copy the first row through untouched.
    pub skip_header: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        ExpandOptions {
            explode: BTreeSet::new(),
            bring_down: BTreeSet::new(),
            preserve_original_row: false,
            separator: DEFAULT_SEPARATOR,
            skip_header: false,
        }
    }
}

/// Fragments contributed by each column of a single row.
struct Fragments<'a> {
    columns: Vec<Vec<&'a str>>,
    max: usize,
}

impl<'a> Fragments<'a> {
    fn of(row: &'a [String], options: &ExpandOptions) -> Self {
        let columns: Vec<Vec<&str>> = row
            .iter()
            .enumerate()
            .map(|(col, value)| {
                if options.explode.contains(&col) {
                    value.split(options.separator).collect()
                } else if options.bring_down.contains(&col) {
                    vec![value.as_str()]
                } else {
                    Vec::new()
                }
            })
            .collect();

        let max = columns.iter().map(Vec::len).max().unwrap_or(0).max(1);

        Fragments { columns, max }
    }

    /// Builds inserted row `index`, falling back to the original value for
    /// bring-down columns and to an empty cell for everything else.
    fn inserted_row(&self, index: usize, options: &ExpandOptions) -> Row {
        self.columns
            .iter()
            .enumerate()
            .map(|(col, fragments)| match fragments.get(index) {
                Some(fragment) => fragment.to_string(),
                None if options.bring_down.contains(&col) => fragments[0].to_string(),
                None => String::new(),
            })
            .collect()
    }

    /// The first row when the original is not preserved: exploded columns
    /// take their first fragment, every other column keeps its value.
    fn lead_row(&self, original: &[String]) -> Row {
        self.columns
            .iter()
            .zip(original)
            .map(|(fragments, value)| match fragments.first() {
                Some(fragment) => fragment.to_string(),
                None => value.clone(),
            })
            .collect()
    }
}

/// Expands a single row into the rows that replace it in the output.
pub fn expand_row(row: &[String], options: &ExpandOptions) -> Vec<Row> {
    let fragments = Fragments::of(row, options);

    if options.preserve_original_row {
        let mut rows = Vec::with_capacity(1 + fragments.max);
        rows.push(row.to_vec());
        if fragments.max > 1 {
            rows.extend((0..fragments.max).map(|i| fragments.inserted_row(i, options)));
        }
        rows
    } else {
        let mut rows = Vec::with_capacity(fragments.max);
        rows.push(fragments.lead_row(row));
        rows.extend((1..fragments.max).map(|i| fragments.inserted_row(i, options)));
        rows
    }
}

/// Expands every row of the table, keeping source order.
pub fn expand(table: &Table, options: &ExpandOptions) -> Table {
    let mut source = table.rows().iter();
    let mut rows = Vec::with_capacity(table.len());

    if options.skip_header {
        if let Some(header) = source.next() {
            rows.push(header.clone());
        }
    }

    for row in source {
        rows.extend(expand_row(row, options));
    }

    debug!(
        "Expanded {} rows into {} rows ({} columns)",
        table.len(),
        rows.len(),
        table.num_columns()
    );

    // Every output row has exactly as many fields as its source row.
    Table::from_rectangular(rows)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // -- Strategy helpers --

    fn arb_table() -> impl Strategy<Value = Table> {
        (1usize..6).prop_flat_map(|width| {
            prop::collection::vec(prop::collection::vec("[ab/]{0,6}", width), 0..8)
                .prop_map(|rows| Table::from_rows(rows).unwrap_or_default())
        })
    }

    fn arb_options() -> impl Strategy<Value = ExpandOptions> {
        (
            prop::collection::btree_set(0usize..7, 0..4),
            prop::collection::btree_set(0usize..7, 0..4),
            any::<bool>(),
        )
            .prop_map(|(explode, bring_down, preserve_original_row)| ExpandOptions {
                explode,
                bring_down,
                preserve_original_row,
                ..ExpandOptions::default()
            })
    }

    fn fragment_count(row: &[String], options: &ExpandOptions) -> usize {
        row.iter()
            .enumerate()
            .filter(|(col, _)| options.explode.contains(col))
            .map(|(_, value)| value.matches(options.separator).count() + 1)
            .max()
            .unwrap_or(1)
    }

    proptest! {
        #[test]
        fn expand_is_deterministic(t in arb_table(), opts in arb_options()) {
            prop_assert_eq!(expand(&t, &opts), expand(&t, &opts));
        }

        #[test]
        fn output_keeps_table_width(t in arb_table(), opts in arb_options()) {
            let out = expand(&t, &opts);
            for row in out.rows() {
                prop_assert_eq!(row.len(), t.num_columns());
            }
        }

        #[test]
        fn row_count_follows_fragment_count(t in arb_table(), opts in arb_options()) {
            let expected: usize = t
                .rows()
                .iter()
                .map(|row| {
                    let n = fragment_count(row, &opts);
                    match (opts.preserve_original_row, n) {
                        (true, 1) => 1,
                        (true, n) => n + 1,
                        (false, n) => n,
                    }
                })
                .sum();
            prop_assert_eq!(expand(&t, &opts).len(), expected);
        }

        #[test]
        fn exploded_fragments_rejoin_to_original(row in prop::collection::vec("[ab/]{0,6}", 1..5)) {
            let t = Table::from_rows(vec![row.clone()]).unwrap_or_default();
            let opts = ExpandOptions {
                explode: (0..row.len()).collect(),
                ..ExpandOptions::default()
            };
            let out = expand(&t, &opts);
            for (col, value) in row.iter().enumerate() {
                let n = value.matches('/').count() + 1;
                let rejoined: Vec<&str> = out.rows()[..n].iter().map(|r| r[col].as_str()).collect();
                prop_assert_eq!(rejoined.join("/"), value.clone());
            }
        }
    }
}
