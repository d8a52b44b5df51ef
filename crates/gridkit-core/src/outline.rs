#![forbid(unsafe_code)]

//! The placement frontier shared by the engine and every strategy.
//!
//! An [`Outline`] is two numeric sequences, one slot per lane: `start` is
//! the near extent of already-placed content along the content axis, `end`
//! the far extent. It is the sole state threaded between successive
//! placement batches - the resume point for incremental layout.
//!
//! # Invariants
//!
//! | ID      | Invariant                                              |
//! |---------|--------------------------------------------------------|
//! | LANES   | `start.len() == end.len()` for the active strategy     |
//! | ORDER   | `start[i] <= end[i]` once a strategy returns           |
//! | FIT-0   | after `fit`, `min(start) == 0` if the pre-fit min <= 0 |
//! | FIT-ID  | fitting an already-fit outline is a no-op              |

use serde::{Deserialize, Serialize};

use crate::item::GridItem;

/// Per-lane min/max extent of placed content along the content axis.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    pub start: Vec<f64>,
    pub end: Vec<f64>,
}

impl Outline {
    /// An outline with `lanes` slots, all at `value`.
    #[must_use]
    pub fn filled(lanes: usize, value: f64) -> Self {
        Self {
            start: vec![value; lanes],
            end: vec![value; lanes],
        }
    }

    /// Number of lanes.
    #[must_use]
    #[inline]
    pub fn lane_count(&self) -> usize {
        self.start.len()
    }

    /// True when no lane has been placed yet.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }

    /// Smallest near-edge value, or 0 for an empty outline.
    #[must_use]
    pub fn min_start(&self) -> f64 {
        if self.start.is_empty() {
            return 0.0;
        }
        self.start.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Container content size implied by this outline:
    /// `max(max(start), max(end) - gap)`, clamped to >= 0.
    #[must_use]
    pub fn content_size(&self, gap: f64) -> f64 {
        let max_start = self.start.iter().copied().fold(0.0, f64::max);
        let max_end = self.end.iter().copied().fold(0.0, f64::max);
        max_start.max(max_end - gap).max(0.0)
    }

    /// Shift the frontier's near edge to 0 and move placed items with it.
    ///
    /// When `min(start) <= 0` (or `force` is set), both sequences and every
    /// item's `content_pos` shift by `-min(start)`. A positive minimum is
    /// left alone unless forced: content must not float away from the
    /// origin. Returns the shift applied (0.0 for a no-op).
    pub fn fit(&mut self, items: &mut [GridItem], force: bool) -> f64 {
        if self.start.is_empty() {
            return 0.0;
        }
        let min = self
            .start
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        if !min.is_finite() || (min > 0.0 && !force) || min == 0.0 {
            return 0.0;
        }
        let shift = -min;
        for v in &mut self.start {
            *v += shift;
        }
        for v in &mut self.end {
            *v += shift;
        }
        for item in items {
            item.target.content_pos += shift;
        }
        shift
    }
}
