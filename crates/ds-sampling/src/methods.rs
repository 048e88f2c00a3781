//! Uniform, random and stratified reduction

use std::hash::Hash;

use ds_core::Row;
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Indices of `target` evenly spaced positions in `0..len`
pub fn uniform_indices(len: usize, target: usize) -> Vec<usize> {
    if len <= target {
        return (0..len).collect();
    }

    let step = len as f64 / target as f64;
    (0..target).map(|i| (i as f64 * step).floor() as usize).collect()
}

/// Keep `target` evenly spaced rows, preserving their order.
///
/// Returns a copy of all rows when there are no more than `target`.
pub fn uniform_sample<T: Clone>(rows: &[T], target: usize) -> Vec<T> {
    uniform_indices(rows.len(), target)
        .into_iter()
        .map(|i| rows[i].clone())
        .collect()
}

/// Shuffle-then-slice random sample using the thread-local generator
pub fn random_sample<T: Clone>(rows: &[T], target: usize) -> Vec<T> {
    random_sample_with(rows, target, &mut rand::thread_rng())
}

/// Shuffle-then-slice random sample with a caller-provided generator
pub fn random_sample_with<T, R>(rows: &[T], target: usize, rng: &mut R) -> Vec<T>
where
    T: Clone,
    R: Rng + ?Sized,
{
    if rows.len() <= target {
        return rows.to_vec();
    }

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.shuffle(rng);
    order.truncate(target);
    order.into_iter().map(|i| rows[i].clone()).collect()
}

/// Sample each group in proportion to its share of the rows.
///
/// Every group keeps at least one row; when that pushes the total over
/// `target`, the largest quotas give rows back first, so all groups survive as
/// long as `target` is at least the number of groups. Output keeps the input
/// order.
pub fn stratified_sample_by<T, K, F>(rows: &[T], target: usize, key: F) -> Vec<T>
where
    T: Clone,
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    if rows.len() <= target {
        return rows.to_vec();
    }
    if target == 0 {
        return Vec::new();
    }

    let mut groups: IndexMap<K, Vec<usize>> = IndexMap::new();
    for (idx, row) in rows.iter().enumerate() {
        groups.entry(key(row)).or_default().push(idx);
    }

    let ratio = target as f64 / rows.len() as f64;
    let mut quotas: Vec<usize> = groups
        .values()
        .map(|members| ((members.len() as f64 * ratio).floor() as usize).max(1))
        .collect();

    let mut total: usize = quotas.iter().sum();
    while total > target {
        match quotas.iter_mut().filter(|q| **q > 1).max_by_key(|q| **q) {
            Some(quota) => {
                *quota -= 1;
                total -= 1;
            }
            None => break,
        }
    }

    let mut picked: Vec<usize> = groups
        .values()
        .zip(&quotas)
        .flat_map(|(members, &quota)| {
            uniform_indices(members.len(), quota)
                .into_iter()
                .map(move |i| members[i])
        })
        .collect();
    picked.sort_unstable();
    // Only trims when there are more groups than `target`
    picked.truncate(target);

    debug!(
        groups = groups.len(),
        input = rows.len(),
        output = picked.len(),
        "Stratified sample"
    );

    picked.into_iter().map(|i| rows[i].clone()).collect()
}

/// Stratify rows by the value of `column`; missing and null values form one group
pub fn stratified_sample(rows: &[Row], target: usize, column: &str) -> Vec<Row> {
    stratified_sample_by(rows, target, |row| {
        row.get(column).map(|v| v.to_string()).unwrap_or_default()
    })
}
