use std::collections::{BTreeMap, HashSet};

use crate::types::TableRecord;

/// Result of merging freshly assembled rows against previously stored rows.
#[derive(Debug)]
pub struct Reconciled<T> {
    /// The de-duplicated union: stored rows plus genuinely new rows.
    pub rows: Vec<T>,
    /// Fresh rows not present in the store; what an append-mode write adds.
    pub new_rows: Vec<T>,
}

fn fingerprint<T: TableRecord>(row: &T) -> String {
    row.record().join("\u{1f}")
}

/// Merges fresh entity rows against the previously persisted table contents.
///
/// Concatenates existing and fresh rows, drops exact duplicates across the
/// whole row (not just the natural key, so a re-listen of the same track at
/// a different time survives), and reports which fresh rows are genuinely
/// new. Re-applying the same fresh rows against an already-updated table
/// yields an empty `new_rows`, which is what makes overlapping runs safe to
/// append: the collision is masked post hoc instead of excluded by a store
/// lock.
pub fn reconcile<T: TableRecord + Clone>(existing: &[T], fresh: &[T]) -> Reconciled<T> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows: Vec<T> = Vec::with_capacity(existing.len() + fresh.len());

    for row in existing {
        if seen.insert(fingerprint(row)) {
            rows.push(row.clone());
        }
    }

    let mut new_rows: Vec<T> = Vec::new();
    for row in fresh {
        if seen.insert(fingerprint(row)) {
            rows.push(row.clone());
            new_rows.push(row.clone());
        }
    }

    Reconciled { rows, new_rows }
}

/// Indexes rows by natural key, preserving row order within a key.
///
/// For the genre-exploded artist table a key maps to several rows; for
/// tracks, to one row per distinct listen of that track.
pub fn index_by_key<T: TableRecord + Clone>(rows: &[T]) -> BTreeMap<String, Vec<T>> {
    let mut index: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for row in rows {
        index.entry(row.key().to_string()).or_default().push(row.clone());
    }
    index
}
