//! Graph helpers shared by the edge derivation passes

use std::collections::BTreeSet;

/// Split `rows` into runs of consecutive rows with the same key.  The
/// last run is returned like any other, so a caller that acts on each
/// run never misses the final group.  Rows with the same key that are
/// not adjacent form separate runs.
pub fn contiguous_runs<'a, R, K, F>(rows: &'a [R], key: F)
    -> impl Iterator<Item = &'a [R]>
where
    F: Fn(&R) -> K,
    K: PartialEq,
{
    rows.chunk_by(move |a, b| key(a) == key(b))
}

/// Return every pair `(a, b)` with `a` from `first` and `b` from
/// `second`, skipping pairs where `a == b`.  Passing the same set twice
/// gives every ordered pair of distinct members.
pub fn product_pairs<'a, T: PartialEq>(first: &'a BTreeSet<T>, second: &'a BTreeSet<T>)
    -> impl Iterator<Item = (&'a T, &'a T)>
{
    first.iter()
        .flat_map(move |a| second.iter().map(move |b| (a, b)))
        .filter(|(a, b)| a != b)
}
