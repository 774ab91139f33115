use std::collections::HashMap;

use crate::core::models::fingerprint::Fingerprint;
use crate::core::models::key::Key;

/// Outcome of putting a key into a fingerprint-sorted vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A key with the same fingerprint was overwritten at this row.
    Replaced(usize),
    /// The key was inserted at this row; later rows shifted down.
    Inserted(usize),
}

impl Placement {
    pub fn row(self) -> usize {
        match self {
            Placement::Replaced(row) | Placement::Inserted(row) => row,
        }
    }
}

/// Binary search a fingerprint-sorted slice.
///
/// `Ok(row)` if present, otherwise `Err(insertion_point)`.
pub fn find(sorted: &[Key], fpr: &Fingerprint) -> Result<usize, usize> {
    sorted.binary_search_by(|probe| probe.fingerprint.cmp(fpr))
}

pub fn contains(sorted: &[Key], fpr: &Fingerprint) -> bool {
    find(sorted, fpr).is_ok()
}

pub fn get<'a>(sorted: &'a [Key], fpr: &Fingerprint) -> Option<&'a Key> {
    find(sorted, fpr).ok().map(|row| &sorted[row])
}

/// Where `key` would go: `Replaced(row)` for an existing fingerprint,
/// `Inserted(row)` for the insertion point. Nothing is modified.
pub fn locate(sorted: &[Key], fpr: &Fingerprint) -> Placement {
    match find(sorted, fpr) {
        Ok(row) => Placement::Replaced(row),
        Err(row) => Placement::Inserted(row),
    }
}

/// Insert or replace `key`, keeping `sorted` ordered and duplicate free.
pub fn upsert(sorted: &mut Vec<Key>, key: Key) -> Placement {
    let placement = locate(sorted, &key.fingerprint);
    match placement {
        Placement::Replaced(row) => sorted[row] = key,
        Placement::Inserted(row) => sorted.insert(row, key),
    }
    placement
}

/// Remove the key with `fpr`, returning the row it occupied.
pub fn remove(sorted: &mut Vec<Key>, fpr: &Fingerprint) -> Option<(usize, Key)> {
    let row = find(sorted, fpr).ok()?;
    Some((row, sorted.remove(row)))
}

pub fn is_sorted_unique(keys: &[Key]) -> bool {
    keys.windows(2).all(|w| w[0].fingerprint < w[1].fingerprint)
}

/// Normalize an incoming batch: drop null keys, sort by fingerprint,
/// and collapse duplicates so the last occurrence in `keys` wins.
pub fn prepare_batch(keys: Vec<Key>) -> Vec<Key> {
    let mut batch: Vec<Key> = keys.into_iter().filter(|k| !k.is_null()).collect();
    // Stable, so equal fingerprints keep their arrival order.
    batch.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));

    let mut result: Vec<Key> = Vec::with_capacity(batch.len());
    for key in batch {
        match result.last_mut() {
            Some(last) if last.fingerprint == key.fingerprint => *last = key,
            _ => result.push(key),
        }
    }
    result
}

/// Order a batch so every key comes after its issuer when that issuer is
/// part of the same batch.
///
/// Each key has at most one issuer, so the issuer graph is a forest of
/// chains plus, for inconsistent data, cycles. Chains are walked
/// upward iteratively. A cycle is cut at the point where the walk
/// meets itself, so the output always contains every input key exactly
/// once. Keys unrelated by issuance keep their fingerprint order.
pub fn topological_sort(batch: &[Key]) -> Vec<Key> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        OnPath,
        Done,
    }

    let position: HashMap<&Fingerprint, usize> = batch
        .iter()
        .enumerate()
        .map(|(i, k)| (&k.fingerprint, i))
        .collect();
    let issuer_of = |i: usize| -> Option<usize> {
        batch[i]
            .clean_chain_id()
            .and_then(|issuer| position.get(issuer).copied())
    };

    let mut marks = vec![Mark::Unvisited; batch.len()];
    let mut order = Vec::with_capacity(batch.len());
    let mut path = Vec::new();

    for start in 0..batch.len() {
        let mut current = Some(start);
        while let Some(i) = current {
            if marks[i] != Mark::Unvisited {
                break;
            }
            marks[i] = Mark::OnPath;
            path.push(i);
            current = issuer_of(i);
        }
        // `path` runs from subject to issuer; emit issuers first.
        while let Some(i) = path.pop() {
            marks[i] = Mark::Done;
            order.push(i);
        }
    }

    debug_assert_eq!(order.len(), batch.len());
    order.into_iter().map(|i| batch[i].clone()).collect()
}
