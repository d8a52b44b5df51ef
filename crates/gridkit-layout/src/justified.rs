#![forbid(unsafe_code)]

//! Justified rows that fill the container width exactly.
//!
//! Items are grouped into rows such that scaling every member to a common
//! row height makes the row span the container inline size. Row boundaries
//! come from a shortest-path search over candidate break points; the edge
//! weight is the squared row penalty, so rows whose natural height sits
//! inside the configured size range are free and everything else pays
//! quadratically.
//!
//! # Failure handling
//!
//! | Condition                        | Behavior                           |
//! |----------------------------------|------------------------------------|
//! | no grouping within column range  | remainder becomes one final row    |
//! | zero ratio sum in a row          | row height 0, items zero-sized     |
//! | row count outside `row_range`    | ranked by penalty, never an error  |

use gridkit_core::{Direction, GridItem, Orientation, Outline};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tracing::trace;

use crate::{LayoutContext, PlacementStrategy, reseed};

/// Extra sharpness applied when a row's natural height overflows a finite
/// maximum, so oversized rows lose to undersized ones of equal distance.
const OVERSIZE_SHARPNESS: f64 = 10.0;

/// Configuration for [`Justified`].
#[derive(Debug, Clone, PartialEq)]
pub struct JustifiedOptions {
    /// Gap between adjacent items on both axes.
    pub gap: f64,
    /// Inclusive bounds on items per row.
    pub column_range: (usize, usize),
    /// Inclusive bounds on the number of rows per placement batch. When
    /// set, the search explores groupings combinatorially instead of by
    /// shortest path.
    pub row_range: Option<(usize, usize)>,
    /// Preferred row-height range; heights inside it cost nothing.
    pub size_range: (f64, f64),
    /// Clamp row heights into `size_range` and rescale widths to still
    /// fill the container, accepting aspect-ratio distortion.
    pub is_cropped_size: bool,
}

impl Default for JustifiedOptions {
    fn default() -> Self {
        Self {
            gap: 0.0,
            column_range: (1, 8),
            row_range: None,
            size_range: (0.0, f64::INFINITY),
            is_cropped_size: false,
        }
    }
}

/// Shortest-path row grouping strategy.
#[derive(Debug, Clone, Default)]
pub struct Justified {
    opts: JustifiedOptions,
}

/// Per-item inputs to the row equations, with offsets factored out.
#[derive(Debug, Clone, Copy)]
struct RowEntry {
    /// Inline/content ratio of the scalable part.
    ratio: f64,
    /// Non-scaling inline border.
    inline_offset: f64,
    /// Non-scaling content border.
    content_offset: f64,
}

impl Justified {
    #[must_use]
    pub fn new(opts: JustifiedOptions) -> Self {
        Self { opts }
    }

    fn entries(&self, items: &mut [GridItem], orientation: Orientation) -> Vec<RowEntry> {
        items
            .iter_mut()
            .map(|item| {
                let inline_offset = item
                    .directives
                    .inline_offset
                    .unwrap_or(item.derived.inline);
                let content_offset = item
                    .directives
                    .content_offset
                    .unwrap_or(item.derived.content);
                item.derived.inline = inline_offset;
                item.derived.content = content_offset;

                let inline = (item.inline_size(orientation) - inline_offset).max(0.0);
                let content = item.content_size(orientation) - content_offset;
                let ratio = if content > 0.0 { inline / content } else { 1.0 };
                RowEntry {
                    ratio,
                    inline_offset,
                    content_offset,
                }
            })
            .collect()
    }

    /// Row height at which `entries[i..j]` fill the container exactly.
    fn expected_height(&self, container: f64, entries: &[RowEntry]) -> f64 {
        let count = entries.len();
        if count == 0 {
            return 0.0;
        }
        let ratio_sum: f64 = entries.iter().map(|e| e.ratio).sum();
        if ratio_sum <= 0.0 {
            return 0.0;
        }
        let offset_sum: f64 = entries.iter().map(|e| e.inline_offset).sum();
        let weighted_content: f64 = entries
            .iter()
            .map(|e| e.content_offset * e.ratio)
            .sum();
        let available =
            container - self.opts.gap * (count as f64 - 1.0) - offset_sum + weighted_content;
        (available / ratio_sum).max(0.0)
    }

    /// The configured height range, normalized so `min <= max` and both
    /// bounds are orderable. Host configuration is not trusted here: an
    /// inverted or NaN range must degrade, not panic in `clamp`.
    fn size_bounds(&self) -> (f64, f64) {
        let (min, max) = self.opts.size_range;
        let min = if min.is_nan() { 0.0 } else { min };
        let max = if max.is_nan() { f64::INFINITY } else { max };
        if min <= max { (min, max) } else { (max, min) }
    }

    /// Squared, asymmetric penalty of a row of the given natural height.
    fn row_weight(&self, height: f64) -> f64 {
        let (min, max) = self.size_bounds();
        let distance = if height < min {
            min - height
        } else if height > max && max.is_finite() {
            (height - max) * OVERSIZE_SHARPNESS
        } else {
            0.0
        };
        distance * distance
    }

    fn weight_of(&self, container: f64, entries: &[RowEntry]) -> f64 {
        self.row_weight(self.expected_height(container, entries))
    }

    /// Break points chosen by Dijkstra over `0..=n`, honoring the
    /// items-per-row range. When the final node is unreachable the longest
    /// reachable prefix keeps its path and the remainder becomes one final
    /// row.
    fn shortest_breaks(&self, container: f64, entries: &[RowEntry]) -> Vec<usize> {
        let n = entries.len();
        let (min_c, max_c) = self.opts.column_range;
        let min_c = min_c.max(1);
        let max_c = max_c.max(min_c);

        let mut dist = vec![f64::INFINITY; n + 1];
        let mut prev = vec![usize::MAX; n + 1];
        dist[0] = 0.0;
        let mut heap = BinaryHeap::new();
        heap.push(HeapNode { cost: 0.0, node: 0 });
        while let Some(HeapNode { cost, node }) = heap.pop() {
            if cost > dist[node] {
                continue;
            }
            for next in (node + min_c)..=(node + max_c).min(n) {
                let weight = self.weight_of(container, &entries[node..next]);
                let candidate = cost + weight;
                if candidate < dist[next] {
                    dist[next] = candidate;
                    prev[next] = node;
                    heap.push(HeapNode {
                        cost: candidate,
                        node: next,
                    });
                }
            }
        }

        let mut tail = n;
        if dist[n].is_infinite() {
            // No grouping covers every item; close with one final row.
            tail = (0..n).rev().find(|&k| dist[k].is_finite()).unwrap_or(0);
        }
        let mut breaks = vec![tail];
        let mut node = tail;
        while node != 0 {
            node = prev[node];
            breaks.push(node);
        }
        breaks.reverse();
        if tail != n {
            breaks.push(n);
        }
        breaks
    }

    /// Combinatorial grouping search used when a row-count range is set.
    ///
    /// Candidates are ranked lexicographically by (distance of the row
    /// count from `row_range`, total weight).
    fn ranked_breaks(
        &self,
        container: f64,
        entries: &[RowEntry],
        row_range: (usize, usize),
    ) -> Vec<usize> {
        let n = entries.len();
        let (min_c, max_c) = self.opts.column_range;
        let min_c = min_c.max(1);
        let max_c = max_c.max(min_c);

        let mut best: Option<(f64, f64, Vec<usize>)> = None;
        let mut stack = vec![0usize];
        self.explore(
            container,
            entries,
            row_range,
            (min_c, max_c),
            &mut stack,
            0.0,
            &mut best,
        );
        match best {
            Some((_, _, breaks)) => breaks,
            // Nothing satisfies the column range at all: one row of
            // everything.
            None => vec![0, n],
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn explore(
        &self,
        container: f64,
        entries: &[RowEntry],
        row_range: (usize, usize),
        column_range: (usize, usize),
        stack: &mut Vec<usize>,
        weight: f64,
        best: &mut Option<(f64, f64, Vec<usize>)>,
    ) {
        let n = entries.len();
        let position = *stack.last().expect("stack seeded with 0");
        if position == n {
            let rows = stack.len() - 1;
            let row_penalty = if rows < row_range.0 {
                (row_range.0 - rows) as f64
            } else if rows > row_range.1 {
                (rows - row_range.1) as f64
            } else {
                0.0
            };
            let better = match best {
                None => true,
                Some((p, w, _)) => {
                    row_penalty < *p || (row_penalty == *p && weight < *w)
                }
            };
            if better {
                *best = Some((row_penalty, weight, stack.clone()));
            }
            return;
        }
        // Adding rows never lowers the accumulated weight, so once a
        // penalty-free candidate is at or below the current weight nothing
        // down this branch can win.
        if let Some((best_penalty, best_weight, _)) = best
            && *best_penalty == 0.0
            && weight >= *best_weight
        {
            return;
        }
        let (min_c, max_c) = column_range;
        for next in (position + min_c)..=(position + max_c).min(n) {
            let row_weight = self.weight_of(container, &entries[position..next]);
            stack.push(next);
            self.explore(
                container,
                entries,
                row_range,
                column_range,
                stack,
                weight + row_weight,
                best,
            );
            stack.pop();
        }
        // Remainder too short for a full row: close it out as the final
        // row rather than failing.
        if position + min_c > n {
            let row_weight = self.weight_of(container, &entries[position..n]);
            stack.push(n);
            self.explore(
                container,
                entries,
                row_range,
                column_range,
                stack,
                weight + row_weight,
                best,
            );
            stack.pop();
        }
    }

    /// Lay one row out; returns the row height actually used.
    fn apply_row(
        &self,
        container: f64,
        items: &mut [GridItem],
        entries: &[RowEntry],
        content_pos: f64,
    ) -> f64 {
        let gap = self.opts.gap;
        let natural = self.expected_height(container, entries);
        let (height, cropped) = if self.opts.is_cropped_size {
            let (lo, hi) = self.size_bounds();
            let clamped = natural.clamp(lo, hi);
            (clamped, clamped != natural)
        } else {
            (natural, false)
        };

        // Scalable widths at the chosen height; rescaled so the row still
        // fills the container exactly even when the height was cropped.
        let count = items.len() as f64;
        let offset_sum: f64 = entries.iter().map(|e| e.inline_offset).sum();
        let scalable: Vec<f64> = entries
            .iter()
            .map(|e| ((height - e.content_offset) * e.ratio).max(0.0))
            .collect();
        let scalable_sum: f64 = scalable.iter().sum();
        let available = container - gap * (count - 1.0) - offset_sum;
        let scale = if scalable_sum > 0.0 {
            (available / scalable_sum).max(0.0)
        } else {
            0.0
        };

        let mut inline_pos = 0.0;
        for ((item, entry), width) in items.iter_mut().zip(entries).zip(&scalable) {
            let inline_size = width * scale + entry.inline_offset;
            item.target.inline_pos = inline_pos;
            item.target.content_pos = content_pos;
            item.target.inline_size = inline_size;
            item.target.content_size = height;
            if cropped {
                item.should_reupdate = true;
            }
            inline_pos += inline_size + gap;
        }
        height
    }
}

/// Min-heap node; ordering reversed on cost, ties broken on the lower node.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapNode {
    cost: f64,
    node: usize,
}

impl Eq for HeapNode {}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PlacementStrategy for Justified {
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
        let entries = self.entries(items, ctx.orientation);
        let breaks = match self.opts.row_range {
            Some(range) => self.ranked_breaks(container, &entries, range),
            None => self.shortest_breaks(container, &entries),
        };
        trace!(rows = breaks.len() - 1, ?direction, "justified pass");

        // Heights first, so a Start-direction batch knows its total extent
        // before any item is positioned.
        let seed = reseed(outline, 1, direction)[0];
        let mut heights = Vec::with_capacity(breaks.len() - 1);
        for window in breaks.windows(2) {
            let natural = self.expected_height(container, &entries[window[0]..window[1]]);
            let height = if self.opts.is_cropped_size {
                let (lo, hi) = self.size_bounds();
                natural.clamp(lo, hi)
            } else {
                natural
            };
            heights.push(height);
        }
        let total: f64 = heights.iter().map(|h| h + gap).sum();
        let mut cursor = match direction {
            Direction::End => seed,
            Direction::Start => seed - total,
        };

        for window in breaks.windows(2) {
            let (from, to) = (window[0], window[1]);
            let height =
                self.apply_row(container, &mut items[from..to], &entries[from..to], cursor);
            cursor += height + gap;
        }

        match direction {
            Direction::End => Outline {
                start: vec![seed],
                end: vec![cursor],
            },
            Direction::Start => Outline {
                start: vec![seed - total],
                end: vec![seed],
            },
        }
    }
}
