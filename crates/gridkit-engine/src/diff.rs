#![forbid(unsafe_code)]

//! Identity diffing of ordered child lists.
//!
//! The engine never walks a host tree; the host hands it ordered id lists
//! and this module reports what changed between two of them. Items are
//! matched by identity, not by position, so a reorder keeps its entities.

use gridkit_core::ItemId;
use std::collections::HashMap;

/// Result of diffing `prev` against `next`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiffResult {
    /// Indices into `next` of ids not present in `prev`.
    pub added: Vec<usize>,
    /// Indices into `prev` of ids not present in `next`.
    pub removed: Vec<usize>,
    /// `(prev_index, next_index)` for every id present in both.
    pub maintained: Vec<(usize, usize)>,
    /// The subset of `maintained` whose index moved.
    pub changed: Vec<(usize, usize)>,
}

impl DiffResult {
    /// True when the lists are identical in content and order.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Diff two ordered id lists by identity.
///
/// Duplicate ids keep their first occurrence; later duplicates count as
/// added/removed like any unmatched entry.
#[must_use]
pub fn diff_children(prev: &[ItemId], next: &[ItemId]) -> DiffResult {
    let mut prev_index: HashMap<ItemId, usize> = HashMap::with_capacity(prev.len());
    for (index, &id) in prev.iter().enumerate() {
        prev_index.entry(id).or_insert(index);
    }

    let mut result = DiffResult::default();
    let mut matched = vec![false; prev.len()];
    for (next_idx, &id) in next.iter().enumerate() {
        match prev_index.remove(&id) {
            Some(prev_idx) => {
                matched[prev_idx] = true;
                result.maintained.push((prev_idx, next_idx));
                if prev_idx != next_idx {
                    result.changed.push((prev_idx, next_idx));
                }
            }
            None => result.added.push(next_idx),
        }
    }
    for (prev_idx, was_matched) in matched.iter().enumerate() {
        if !was_matched {
            result.removed.push(prev_idx);
        }
    }
    result
}
