#![forbid(unsafe_code)]

//! Brick-style column stacking.
//!
//! Items are dropped one at a time into the lane window whose frontier is
//! nearest, then the window's frontier advances past the item. Column count
//! and size are either configured or derived from the container and the
//! first measurable item.
//!
//! # Placement rule
//!
//! | Direction | Window candidate       | Window choice        | Tie     |
//! |-----------|------------------------|----------------------|---------|
//! | End       | max frontier in window | minimal candidate    | low idx |
//! | Start     | min frontier in window | maximal candidate    | low idx |

use gridkit_core::{Direction, GridItem, Outline};
use tracing::trace;

use crate::{LayoutContext, PlacementStrategy, reseed};

/// Inline distribution of lanes within the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MasonryAlign {
    /// Lanes packed at the inline start.
    #[default]
    Start,
    /// Lanes centered as a block.
    Center,
    /// Lanes packed at the inline end.
    End,
    /// Lanes distributed across the full inline size.
    Justify,
    /// Lanes resized so the block fills the inline size exactly.
    Stretch,
}

/// Configuration for [`Masonry`].
#[derive(Debug, Clone, PartialEq)]
pub struct MasonryOptions {
    /// Gap between adjacent items on both axes.
    pub gap: f64,
    pub align: MasonryAlign,
    /// Fixed column count; 0 derives it from the container.
    pub column: usize,
    /// Fixed column size; 0 derives it from the first measurable item.
    pub column_size: f64,
    /// In stretch alignment, the largest column size allowed when deriving
    /// the column count.
    pub max_stretch_column_size: Option<f64>,
    /// Default span-growth bound when an item carries none.
    pub max_column_span: Option<u32>,
}

impl Default for MasonryOptions {
    fn default() -> Self {
        Self {
            gap: 0.0,
            align: MasonryAlign::Start,
            column: 0,
            column_size: 0.0,
            max_stretch_column_size: None,
            max_column_span: None,
        }
    }
}

/// Greedy column-balancing strategy.
#[derive(Debug, Clone, Default)]
pub struct Masonry {
    opts: MasonryOptions,
}

impl Masonry {
    #[must_use]
    pub fn new(opts: MasonryOptions) -> Self {
        Self { opts }
    }

    /// Resolve `(column_count, column_size)` for this pass.
    fn resolve_columns(&self, ctx: &LayoutContext, items: &[GridItem]) -> (usize, f64) {
        let opts = &self.opts;
        let gap = opts.gap;
        let container = ctx.container_inline_size.max(0.0);
        let first_size = items
            .iter()
            .map(|item| item.inline_size(ctx.orientation))
            .find(|size| *size > 0.0);

        let mut columns = opts.column;
        if columns == 0 {
            if opts.align == MasonryAlign::Stretch
                && let Some(max_size) = opts.max_stretch_column_size
                && max_size > 0.0
            {
                columns = ((container + gap) / (max_size + gap)).ceil() as usize;
            } else {
                let base = if opts.column_size > 0.0 {
                    opts.column_size
                } else {
                    first_size.unwrap_or(container)
                };
                if base + gap > 0.0 {
                    columns = ((container + gap) / (base + gap)).floor() as usize;
                }
            }
        }
        let columns = columns.max(1);

        let column_size = if opts.column_size > 0.0 {
            opts.column_size
        } else if opts.align == MasonryAlign::Stretch {
            ((container + gap) / columns as f64 - gap).max(0.0)
        } else {
            first_size.unwrap_or(((container + gap) / columns as f64 - gap).max(0.0))
        };
        (columns, column_size.max(0.0))
    }

    /// Inline position of each lane under the configured alignment.
    fn lane_positions(&self, ctx: &LayoutContext, columns: usize, column_size: f64) -> Vec<f64> {
        let gap = self.opts.gap;
        let container = ctx.container_inline_size;
        let pitch = column_size + gap;
        let occupied = columns as f64 * pitch - gap;
        match self.opts.align {
            MasonryAlign::Start | MasonryAlign::Stretch => {
                (0..columns).map(|i| i as f64 * pitch).collect()
            }
            MasonryAlign::Center => {
                let offset = (container - occupied) / 2.0;
                (0..columns).map(|i| offset + i as f64 * pitch).collect()
            }
            MasonryAlign::End => {
                let offset = container - occupied;
                (0..columns).map(|i| offset + i as f64 * pitch).collect()
            }
            MasonryAlign::Justify => {
                if columns == 1 {
                    vec![(container - column_size) / 2.0]
                } else {
                    let step = (container - column_size) / (columns - 1) as f64;
                    (0..columns).map(|i| i as f64 * step).collect()
                }
            }
        }
    }

    /// Window start index and frontier candidate for an item of `span`.
    fn pick_window(frontier: &[f64], span: usize, direction: Direction) -> (usize, f64) {
        let windows = frontier.len() - span;
        let mut best_index = 0;
        let mut best_candidate = Self::window_candidate(frontier, 0, span, direction);
        for j in 1..=windows {
            let candidate = Self::window_candidate(frontier, j, span, direction);
            let better = match direction {
                Direction::End => candidate < best_candidate,
                Direction::Start => candidate > best_candidate,
            };
            if better {
                best_index = j;
                best_candidate = candidate;
            }
        }
        (best_index, best_candidate)
    }

    fn window_candidate(frontier: &[f64], start: usize, span: usize, direction: Direction) -> f64 {
        let window = &frontier[start..start + span];
        match direction {
            Direction::End => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Direction::Start => window.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

impl PlacementStrategy for Masonry {
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
        let (columns, column_size) = self.resolve_columns(ctx, items);
        let pitch = column_size + gap;
        let positions = self.lane_positions(ctx, columns, column_size);
        let mut frontier = reseed(outline, columns, direction);
        let seed = frontier.clone();
        trace!(columns, column_size, ?direction, "masonry pass");

        let sized = self.opts.align == MasonryAlign::Stretch || self.opts.column_size > 0.0;
        for item in items.iter_mut() {
            let inline = item.inline_size(ctx.orientation);
            let content = item.content_size(ctx.orientation);
            let span = item
                .directives
                .column_span
                .map(|s| s as usize)
                .unwrap_or_else(|| {
                    if pitch > 0.0 {
                        ((inline + gap) / pitch).round() as usize
                    } else {
                        1
                    }
                })
                .clamp(1, columns);

            let (index, mut pos) = Self::pick_window(&frontier, span, direction);
            let mut span = span;

            // Grow toward the max span while the adjacent lane would not
            // push the item further out.
            let max_span = item
                .directives
                .max_column_span
                .or(self.opts.max_column_span)
                .map(|s| (s as usize).min(columns));
            if let Some(max_span) = max_span {
                while span < max_span && index + span < columns {
                    let adjacent = frontier[index + span];
                    let blocked = match direction {
                        Direction::End => adjacent > pos,
                        Direction::Start => adjacent < pos,
                    };
                    if blocked {
                        break;
                    }
                    span += 1;
                }
                pos = Self::window_candidate(&frontier, index, span, direction);
            }

            let content_pos = match direction {
                Direction::End => pos,
                Direction::Start => pos - content,
            };
            item.target.inline_pos = positions[index];
            item.target.inline_size = if sized || span > 1 {
                span as f64 * pitch - gap
            } else {
                inline
            };
            item.target.content_pos = content_pos;
            item.target.content_size = content;

            let advanced = match direction {
                Direction::End => content_pos + content + gap,
                Direction::Start => content_pos - gap,
            };
            for lane in &mut frontier[index..index + span] {
                *lane = advanced;
            }
        }

        match direction {
            Direction::End => Outline {
                start: seed,
                end: frontier,
            },
            Direction::Start => Outline {
                start: frontier,
                end: seed,
            },
        }
    }
}
