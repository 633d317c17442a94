//! Two-pointer outer merge-join over two key-sorted Collections.

use std::collections::HashMap;

use serde::Serialize;

use crate::collection::{Collection, Record};
use crate::error::MatchError;

/// Derived output column. `compute` sees the fully merged row and its
/// result is stored under `name`, appended as the last output column.
pub struct MatchColumn {
    pub name: String,
    pub compute: Box<dyn Fn(&HashMap<String, String>) -> String>,
}

#[derive(Default)]
pub struct JoinOptions {
    pub match_column: Option<MatchColumn>,
}

/// How the two sides paired up. `merged` counts equal-key pairs emitted as
/// one row, `building_conflicts` equal-key pairs split into two rows.
///
/// Rows emitted = `merged + 2 * building_conflicts + left_only + right_only`;
/// `left_rows = merged + building_conflicts + left_only`, and symmetrically
/// for the right side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    pub merged: usize,
    pub building_conflicts: usize,
    pub left_only: usize,
    pub right_only: usize,
}

/// Output header: A's columns in source order, then B's columns not already
/// present, then the optional match column.
pub fn output_columns(a: &Collection, b: &Collection, options: &JoinOptions) -> Vec<String> {
    let mut columns = a.columns.clone();
    for column in &b.columns {
        if !columns.contains(column) {
            columns.push(column.clone());
        }
    }
    if let Some(mc) = &options.match_column {
        columns.push(mc.name.clone());
    }
    columns
}

/// Merge-join `a` and `b`, calling `emit` once per output row in output
/// order. Both Collections must be sorted ascending by key, which
/// [`Collection::from_csv`](crate::collection::Collection::from_csv)
/// guarantees.
///
/// Equal keys merge into one row with A's values winning on column overlap,
/// unless both records carry building names that differ; such a collision
/// emits the two records separately, A's first. Pairing per equal-key step
/// is one-to-one, so surplus duplicate keys on either side fall out as
/// unmatched rows on later steps.
pub fn merge_join<F>(
    a: &Collection,
    b: &Collection,
    options: &JoinOptions,
    mut emit: F,
) -> Result<JoinSummary, MatchError>
where
    F: FnMut(HashMap<String, String>) -> Result<(), MatchError>,
{
    let mut summary = JoinSummary {
        left_rows: a.records.len(),
        right_rows: b.records.len(),
        ..JoinSummary::default()
    };

    let mut i = 0;
    let mut j = 0;

    while i < a.records.len() || j < b.records.len() {
        let left = a.records.get(i);
        let right = b.records.get(j);

        if let Some(l) = left {
            if right.map_or(true, |r| l.key <= r.key) {
                match right.filter(|r| r.key == l.key) {
                    None => {
                        // A strictly below B (or B exhausted): A is unmatched.
                        emit(compose(l, None, options))?;
                        summary.left_only += 1;
                        i += 1;
                    }
                    Some(r) => {
                        // Candidate match on equal keys.
                        if buildings_agree(l, r) {
                            emit(compose(l, Some(r), options))?;
                            summary.merged += 1;
                        } else {
                            emit(compose(l, None, options))?;
                            emit(compose(r, None, options))?;
                            summary.building_conflicts += 1;
                        }
                        i += 1;
                        j += 1;
                    }
                }
                continue;
            }
        }

        if let Some(r) = right {
            emit(compose(r, None, options))?;
            summary.right_only += 1;
            j += 1;
        }
    }

    Ok(summary)
}

/// Equal keys merge unless both sides name a building and the names differ.
fn buildings_agree(a: &Record, b: &Record) -> bool {
    match (&a.building_name, &b.building_name) {
        (Some(left), Some(right)) => left == right,
        _ => true,
    }
}

/// Merge-with-precedence into a fresh map: B's fields first, A's overlaid
/// on top. The match column, if configured, is computed over the merged
/// row and stored last.
fn compose(a: &Record, b: Option<&Record>, options: &JoinOptions) -> HashMap<String, String> {
    let mut row = match b {
        Some(b) => {
            let mut merged = b.fields.clone();
            for (column, value) in &a.fields {
                merged.insert(column.clone(), value.clone());
            }
            merged
        }
        None => a.fields.clone(),
    };

    if let Some(mc) = &options.match_column {
        let value = (mc.compute)(&row);
        row.insert(mc.name.clone(), value);
    }

    row
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
