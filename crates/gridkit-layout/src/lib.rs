#![forbid(unsafe_code)]

//! Placement strategies.
//!
//! This crate provides the four packing algorithms of the gridkit engine:
//!
//! - [`Masonry`] - greedy column balancing over a lane frontier
//! - [`Justified`] - shortest-path row grouping that fills the container
//!   width exactly
//! - [`Frame`] - template tiling with optional gap-fill bridging
//! - [`Packing`] - recursive area-splitting over a binary space partition
//!
//! Every strategy is a pure function over `(items, direction, outline)`
//! returning the next outline, mutating each item's `target` as a side
//! effect. Strategies never fail: degenerate input produces degenerate
//! (zero-sized) output rather than an error, because a layout engine must
//! not crash its host.

pub mod frame;
pub mod justified;
pub mod masonry;
pub mod packing;

pub use frame::{Frame, FrameOptions, RectSize};
pub use gridkit_core::{Direction, GridItem, Orientation, Outline};
pub use justified::{Justified, JustifiedOptions};
pub use masonry::{Masonry, MasonryAlign, MasonryOptions};
pub use packing::{Packing, PackingOptions, WeightPriority};

/// Immutable per-call inputs shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutContext {
    /// Container extent across the lanes.
    pub container_inline_size: f64,
    /// Mapping of the logical axes onto width/height.
    pub orientation: Orientation,
}

impl LayoutContext {
    /// Context for a vertical grid of the given inline size.
    #[must_use]
    pub const fn vertical(container_inline_size: f64) -> Self {
        Self {
            container_inline_size,
            orientation: Orientation::Vertical,
        }
    }
}

/// A placement algorithm over the shared outline model.
///
/// `outline` is the seed side for the given direction: the previous `end`
/// sequence when appending, the previous `start` sequence when prepending.
/// Implementations may receive a seed whose lane count differs from their
/// own; they re-seed from its extreme value in that case.
pub trait PlacementStrategy {
    /// Gap between adjacent items on both axes.
    fn gap(&self) -> f64;

    /// Compute target boxes for `items` and return the next outline.
    ///
    /// On return `start[i] <= end[i]` holds for every lane. An empty item
    /// slice yields the seed unchanged on both sides.
    fn place(
        &self,
        ctx: &LayoutContext,
        items: &mut [GridItem],
        direction: Direction,
        outline: &[f64],
    ) -> Outline;
}

/// Re-seed an outline side for a strategy with `lanes` lanes.
///
/// When the incoming seed already has the right lane count it is kept;
/// otherwise every lane restarts from the seed's extreme value in the
/// placement direction (0 for an empty seed).
pub(crate) fn reseed(outline: &[f64], lanes: usize, direction: Direction) -> Vec<f64> {
    if outline.len() == lanes {
        return outline.to_vec();
    }
    let seed = match direction {
        Direction::End => outline.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Direction::Start => outline.iter().copied().fold(f64::INFINITY, f64::min),
    };
    let seed = if seed.is_finite() { seed } else { 0.0 };
    vec![seed; lanes]
}

#[cfg(test)]
pub(crate) mod test_util {
    use gridkit_core::{GridItem, ItemId, Rect};

    /// Items with the given physical sizes, ids 1..=n.
    pub fn items_with_sizes(sizes: &[(f64, f64)]) -> Vec<GridItem> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| {
                let mut item = GridItem::new(ItemId::new(i as u64 + 1).unwrap());
                item.record_measurement(Rect::from_size(w, h));
                item
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reseed_keeps_matching_lane_count() {
        assert_eq!(reseed(&[1.0, 2.0], 2, Direction::End), vec![1.0, 2.0]);
    }

    #[test]
    fn reseed_uses_extreme_for_mismatched_count() {
        assert_eq!(reseed(&[1.0, 5.0], 3, Direction::End), vec![5.0; 3]);
        assert_eq!(reseed(&[1.0, 5.0], 3, Direction::Start), vec![1.0; 3]);
    }

    #[test]
    fn reseed_of_empty_seed_is_zero() {
        assert_eq!(reseed(&[], 2, Direction::End), vec![0.0, 0.0]);
    }
}
