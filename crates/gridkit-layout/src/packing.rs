#![forbid(unsafe_code)]

//! Proportional area packing over a binary space partition.
//!
//! The container footprint is the root box. Every new item carves a slice
//! out of one existing box, splitting it along the content or the inline
//! axis; the split chosen is the one minimizing a weighted deviation of
//! both the item and the residual box from their natural sizes and ratios.
//! After each insertion the partition rescales so it exactly fills the
//! footprint, so the leaf areas always sum to the footprint area.

use gridkit_core::{Direction, GridItem, Outline};
use tracing::trace;

use crate::{LayoutContext, PlacementStrategy, reseed};

/// Which deviation dominates the split cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightPriority {
    /// Use the configured `size_weight`/`ratio_weight` as-is.
    #[default]
    Custom,
    /// Favor matching natural sizes.
    Size,
    /// Favor matching natural aspect ratios.
    Ratio,
}

/// Configuration for [`Packing`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackingOptions {
    /// Gap between adjacent items on both axes.
    pub gap: f64,
    /// Inline/content ratio of the packed footprint.
    pub aspect_ratio: f64,
    pub weight_priority: WeightPriority,
    pub size_weight: f64,
    pub ratio_weight: f64,
}

impl Default for PackingOptions {
    fn default() -> Self {
        Self {
            gap: 0.0,
            aspect_ratio: 1.0,
            weight_priority: WeightPriority::Custom,
            size_weight: 1.0,
            ratio_weight: 1.0,
        }
    }
}

/// One box of the partition. Boxes are index-aligned with the items they
/// hold; `org_*` keep the natural (gap-inclusive) dimensions the cost
/// function measures deviation against.
#[derive(Debug, Clone, Copy)]
struct BoxNode {
    inline_pos: f64,
    content_pos: f64,
    inline_size: f64,
    content_size: f64,
    org_inline: f64,
    org_content: f64,
}

impl BoxNode {
    #[inline]
    fn area(&self) -> f64 {
        self.inline_size * self.content_size
    }

    #[inline]
    fn org_area(&self) -> f64 {
        self.org_inline * self.org_content
    }

    #[inline]
    fn org_ratio(&self) -> f64 {
        if self.org_content > 0.0 {
            self.org_inline / self.org_content
        } else {
            1.0
        }
    }
}

/// Relative deviation of `value` from `origin`, symmetric in scale:
/// doubling and halving cost the same, a perfect match costs 0.
fn deviation(origin: f64, value: f64) -> f64 {
    if origin <= 0.0 || value <= 0.0 {
        return if origin == value { 0.0 } else { 1.0 };
    }
    let cost = value / origin;
    if cost < 1.0 { 1.0 / cost - 1.0 } else { cost - 1.0 }
}

/// A candidate way to slice an item into an existing box.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    target: usize,
    content_direction: bool,
    item_share: f64,
    cost: f64,
}

/// Recursive area-splitting strategy.
#[derive(Debug, Clone, Default)]
pub struct Packing {
    opts: PackingOptions,
}

impl Packing {
    #[must_use]
    pub fn new(opts: PackingOptions) -> Self {
        Self { opts }
    }

    fn weights(&self) -> (f64, f64) {
        match self.opts.weight_priority {
            WeightPriority::Size => (100.0, 1.0),
            WeightPriority::Ratio => (1.0, 100.0),
            WeightPriority::Custom => (self.opts.size_weight, self.opts.ratio_weight),
        }
    }

    /// Evaluate both split axes of one box for the given item.
    fn candidates_for(
        &self,
        target: usize,
        host: &BoxNode,
        item_org_area: f64,
        item_org_ratio: f64,
        out: &mut Vec<SplitCandidate>,
    ) {
        let (size_weight, ratio_weight) = self.weights();
        let denom = item_org_area + host.org_area();
        let share = if denom > 0.0 {
            item_org_area / denom
        } else {
            0.5
        };
        for content_direction in [true, false] {
            let (item_inline, item_content, rest_inline, rest_content) = if content_direction {
                (
                    host.inline_size,
                    host.content_size * share,
                    host.inline_size,
                    host.content_size * (1.0 - share),
                )
            } else {
                (
                    host.inline_size * share,
                    host.content_size,
                    host.inline_size * (1.0 - share),
                    host.content_size,
                )
            };
            let item_ratio = if item_content > 0.0 {
                item_inline / item_content
            } else {
                1.0
            };
            // The residual box is scored against a fixed square target,
            // not its own natural ratio.
            let rest_ratio_target = 1.0;
            let rest_ratio = if rest_content > 0.0 {
                rest_inline / rest_content
            } else {
                1.0
            };
            let cost = deviation(item_org_area, item_inline * item_content) * size_weight
                + deviation(item_org_ratio, item_ratio) * ratio_weight
                + deviation(host.org_area(), rest_inline * rest_content) * size_weight
                + deviation(rest_ratio_target, rest_ratio) * ratio_weight;
            out.push(SplitCandidate {
                target,
                content_direction,
                item_share: share,
                cost,
            });
        }
    }

    /// Rescale every box so the partition exactly fills the footprint.
    fn rescale(boxes: &mut [BoxNode], footprint_inline: f64, footprint_content: f64) {
        let extent_inline = boxes
            .iter()
            .map(|b| b.inline_pos + b.inline_size)
            .fold(0.0, f64::max);
        let extent_content = boxes
            .iter()
            .map(|b| b.content_pos + b.content_size)
            .fold(0.0, f64::max);
        if extent_inline <= 0.0 || extent_content <= 0.0 {
            return;
        }
        let scale_inline = footprint_inline / extent_inline;
        let scale_content = footprint_content / extent_content;
        for node in boxes {
            node.inline_pos *= scale_inline;
            node.inline_size *= scale_inline;
            node.content_pos *= scale_content;
            node.content_size *= scale_content;
        }
    }
}

impl PlacementStrategy for Packing {
    fn gap(&self) -> f64 {
        self.opts.gap
    }

    fn place(
        &self,
        ctx: &LayoutContext,
        items: &mut [GridItem],
        direction: Direction,
        outline: &[f64],
    ) -> Outline {
        if items.is_empty() {
            return Outline {
                start: outline.to_vec(),
                end: outline.to_vec(),
            };
        }
        let gap = self.opts.gap;
        let container = ctx.container_inline_size.max(0.0);
        let aspect = if self.opts.aspect_ratio > 0.0 {
            self.opts.aspect_ratio
        } else {
            1.0
        };
        let footprint_inline = container + gap;
        let footprint_content = container / aspect + gap;
        trace!(count = items.len(), ?direction, "packing pass");

        let mut boxes: Vec<BoxNode> = Vec::with_capacity(items.len());
        let mut candidates = Vec::with_capacity(8);
        for item in items.iter() {
            let org_inline = item.inline_size(ctx.orientation) + gap;
            let org_content = item.content_size(ctx.orientation) + gap;
            if boxes.is_empty() {
                boxes.push(BoxNode {
                    inline_pos: 0.0,
                    content_pos: 0.0,
                    inline_size: footprint_inline,
                    content_size: footprint_content,
                    org_inline,
                    org_content,
                });
                continue;
            }
            let item_org_area = org_inline * org_content;
            let item_org_ratio = if org_content > 0.0 {
                org_inline / org_content
            } else {
                1.0
            };
            candidates.clear();
            for (index, host) in boxes.iter().enumerate() {
                self.candidates_for(index, host, item_org_area, item_org_ratio, &mut candidates);
            }
            let best = candidates
                .iter()
                .copied()
                .min_by(|a, b| a.cost.total_cmp(&b.cost))
                .expect("boxes is non-empty");

            let host = &mut boxes[best.target];
            let node = if best.content_direction {
                let item_content = host.content_size * best.item_share;
                host.content_size -= item_content;
                BoxNode {
                    inline_pos: host.inline_pos,
                    content_pos: host.content_pos + host.content_size,
                    inline_size: host.inline_size,
                    content_size: item_content,
                    org_inline,
                    org_content,
                }
            } else {
                let item_inline = host.inline_size * best.item_share;
                host.inline_size -= item_inline;
                BoxNode {
                    inline_pos: host.inline_pos + host.inline_size,
                    content_pos: host.content_pos,
                    inline_size: item_inline,
                    content_size: host.content_size,
                    org_inline,
                    org_content,
                }
            };
            boxes.push(node);
            Self::rescale(&mut boxes, footprint_inline, footprint_content);
        }

        let seed = reseed(outline, 1, direction)[0];
        let origin = match direction {
            Direction::End => seed,
            Direction::Start => seed - footprint_content,
        };
        for (item, node) in items.iter_mut().zip(&boxes) {
            item.target.inline_pos = node.inline_pos;
            item.target.content_pos = origin + node.content_pos;
            item.target.inline_size = (node.inline_size - gap).max(0.0);
            item.target.content_size = (node.content_size - gap).max(0.0);
        }
        match direction {
            Direction::End => Outline {
                start: vec![seed],
                end: vec![seed + footprint_content],
            },
            Direction::Start => Outline {
                start: vec![origin],
                end: vec![seed],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::items_with_sizes;

    const EPS: f64 = 1e-6;

    fn footprint_area(container: f64, aspect: f64, gap: f64) -> f64 {
        (container + gap) * (container / aspect + gap)
    }

    #[test]
    fn single_item_fills_the_footprint() {
        let strategy = Packing::new(PackingOptions::default());
        let ctx = LayoutContext::vertical(400.0);
        let mut items = items_with_sizes(&[(50.0, 50.0)]);
        let outline = strategy.place(&ctx, &mut items, Direction::End, &[]);
        assert_eq!(items[0].target.inline_size, 400.0);
        assert_eq!(items[0].target.content_size, 400.0);
        assert_eq!(outline.start, vec![0.0]);
        assert_eq!(outline.end, vec![400.0]);
    }

    #[test]
    fn three_squares_split_deterministically() {
        let strategy = Packing::new(PackingOptions::default());
        let ctx = LayoutContext::vertical(100.0);
        let mut items = items_with_sizes(&[(50.0, 50.0); 3]);
        strategy.place(&ctx, &mut items, Direction::End, &[]);

        // First split halves the footprint along the content axis; the
        // third item then prefers the inline split that restores two
        // perfect squares.
        let t0 = items[0].target;
        let t1 = items[1].target;
        let t2 = items[2].target;
        assert_eq!((t0.inline_pos, t0.content_pos), (0.0, 0.0));
        assert_eq!((t0.inline_size, t0.content_size), (50.0, 50.0));
        assert_eq!((t1.inline_pos, t1.content_pos), (0.0, 50.0));
        assert_eq!((t1.inline_size, t1.content_size), (100.0, 50.0));
        assert_eq!((t2.inline_pos, t2.content_pos), (50.0, 0.0));
        assert_eq!((t2.inline_size, t2.content_size), (50.0, 50.0));
    }

    #[test]
    fn leaf_areas_conserve_the_footprint() {
        let gap = 8.0;
        let strategy = Packing::new(PackingOptions {
            gap,
            aspect_ratio: 1.5,
            ..PackingOptions::default()
        });
        let ctx = LayoutContext::vertical(600.0);
        let mut items = items_with_sizes(&[
            (320.0, 200.0),
            (180.0, 240.0),
            (260.0, 260.0),
            (400.0, 150.0),
            (120.0, 300.0),
        ]);
        strategy.place(&ctx, &mut items, Direction::End, &[]);

        let sum: f64 = items
            .iter()
            .map(|i| (i.target.inline_size + gap) * (i.target.content_size + gap))
            .sum();
        assert!((sum - footprint_area(600.0, 1.5, gap)).abs() < EPS);
    }

    #[test]
    fn weight_priority_overrides_custom_weights() {
        let strategy = Packing::new(PackingOptions {
            weight_priority: WeightPriority::Size,
            size_weight: 7.0,
            ratio_weight: 7.0,
            ..PackingOptions::default()
        });
        assert_eq!(strategy.weights(), (100.0, 1.0));
        let strategy = Packing::new(PackingOptions {
            weight_priority: WeightPriority::Ratio,
            ..PackingOptions::default()
        });
        assert_eq!(strategy.weights(), (1.0, 100.0));
        let strategy = Packing::new(PackingOptions {
            size_weight: 3.0,
            ratio_weight: 5.0,
            ..PackingOptions::default()
        });
        assert_eq!(strategy.weights(), (3.0, 5.0));
    }

    #[test]
    fn deviation_is_scale_symmetric() {
        assert_eq!(deviation(100.0, 100.0), 0.0);
        assert!((deviation(100.0, 200.0) - deviation(100.0, 50.0)).abs() < EPS);
        assert_eq!(deviation(0.0, 0.0), 0.0);
        assert_eq!(deviation(0.0, 10.0), 1.0);
    }

    #[test]
    fn start_direction_packs_before_the_seed() {
        let strategy = Packing::new(PackingOptions::default());
        let ctx = LayoutContext::vertical(200.0);
        let mut items = items_with_sizes(&[(50.0, 50.0); 2]);
        let outline = strategy.place(&ctx, &mut items, Direction::Start, &[300.0]);
        assert_eq!(outline.start, vec![100.0]);
        assert_eq!(outline.end, vec![300.0]);
        assert!(items.iter().all(|i| i.target.content_pos >= 100.0));
    }

    #[test]
    fn zero_container_stays_finite() {
        let strategy = Packing::new(PackingOptions::default());
        let ctx = LayoutContext::vertical(0.0);
        let mut items = items_with_sizes(&[(50.0, 50.0); 3]);
        let outline = strategy.place(&ctx, &mut items, Direction::End, &[]);
        assert!(outline.end[0].is_finite());
        assert!(items.iter().all(|i| i.target.inline_size >= 0.0));
    }
}
