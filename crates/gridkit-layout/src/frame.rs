#![forbid(unsafe_code)]

//! Template tiling.
//!
//! A rectangular template of small integers (0 = empty) is decomposed once
//! into maximal axis-aligned rectangles, one per distinct non-zero value in
//! ascending order. Items are assigned to rectangles cyclically, repeating
//! the template as often as needed; consecutive repetitions can be bridged
//! so blank bands between them collapse.

use gridkit_core::{Direction, GridItem, Outline};
use tracing::trace;

use crate::{LayoutContext, PlacementStrategy, reseed};

/// How a template cell maps to absolute size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RectSize {
    /// Cells are square, sized so the template spans the container.
    #[default]
    Auto,
    /// Both cell extents fixed.
    Fixed(f64),
    /// Cell extents fixed per axis.
    Pair { inline: f64, content: f64 },
}

/// Configuration for [`Frame`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOptions {
    /// Gap between adjacent items on both axes.
    pub gap: f64,
    /// The template; inner vectors are rows along the content axis.
    pub frame: Vec<Vec<u32>>,
    /// Bridge consecutive template repetitions to remove blank bands.
    pub use_frame_fill: bool,
    pub rect_size: RectSize,
}

/// One maximal rectangle of the template, in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TemplateRect {
    inline_pos: usize,
    content_pos: usize,
    inline_span: usize,
    content_span: usize,
}

/// Decomposed template shared by every placement call.
#[derive(Debug, Clone, Default)]
struct Template {
    rects: Vec<TemplateRect>,
    /// Lane count (template columns).
    lanes: usize,
    /// Template rows.
    rows: usize,
    /// Per lane, first covered row (`rows` when never covered).
    leading: Vec<usize>,
    /// Per lane, one past the last covered row (0 when never covered).
    trailing: Vec<usize>,
}

impl Template {
    fn parse(frame: &[Vec<u32>]) -> Self {
        let rows = frame.len();
        let lanes = frame.iter().map(Vec::len).max().unwrap_or(0);
        if rows == 0 || lanes == 0 {
            return Self::default();
        }
        let cell = |row: usize, lane: usize| -> u32 {
            frame[row].get(lane).copied().unwrap_or(0)
        };

        let mut values: Vec<u32> = frame.iter().flatten().copied().filter(|v| *v != 0).collect();
        values.sort_unstable();
        values.dedup();

        let mut rects = Vec::with_capacity(values.len());
        for value in values {
            // Topmost-leftmost occurrence anchors the rectangle.
            let Some((top, left)) = (0..rows)
                .flat_map(|r| (0..lanes).map(move |l| (r, l)))
                .find(|&(r, l)| cell(r, l) == value)
            else {
                continue;
            };
            let mut inline_span = 1;
            while left + inline_span < lanes && cell(top, left + inline_span) == value {
                inline_span += 1;
            }
            let mut content_span = 1;
            while top + content_span < rows
                && (left..left + inline_span)
                    .all(|l| cell(top + content_span, l) == value)
            {
                content_span += 1;
            }
            rects.push(TemplateRect {
                inline_pos: left,
                content_pos: top,
                inline_span,
                content_span,
            });
        }

        let mut leading = vec![rows; lanes];
        let mut trailing = vec![0; lanes];
        for rect in &rects {
            for lane in rect.inline_pos..rect.inline_pos + rect.inline_span {
                leading[lane] = leading[lane].min(rect.content_pos);
                trailing[lane] = trailing[lane].max(rect.content_pos + rect.content_span);
            }
        }
        Self {
            rects,
            lanes,
            rows,
            leading,
            trailing,
        }
    }
}

/// Template tiling strategy.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    opts: FrameOptions,
    template: Template,
}

impl Frame {
    #[must_use]
    pub fn new(opts: FrameOptions) -> Self {
        let template = Template::parse(&opts.frame);
        Self { opts, template }
    }

    /// Cell pitches (cell size + gap) for both axes.
    fn pitches(&self, ctx: &LayoutContext) -> (f64, f64) {
        let gap = self.opts.gap;
        match self.opts.rect_size {
            RectSize::Auto => {
                let lanes = self.template.lanes.max(1) as f64;
                let pitch = ((ctx.container_inline_size + gap) / lanes).max(0.0);
                (pitch, pitch)
            }
            RectSize::Fixed(size) => (size + gap, size + gap),
            RectSize::Pair { inline, content } => (inline + gap, content + gap),
        }
    }
}

impl PlacementStrategy for Frame {
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
        let template = &self.template;
        if items.is_empty() || template.rects.is_empty() {
            // Malformed/empty templates degrade to a no-op placement.
            return Outline {
                start: outline.to_vec(),
                end: outline.to_vec(),
            };
        }
        let gap = self.opts.gap;
        let lanes = template.lanes;
        let rect_count = template.rects.len();
        let (inline_pitch, content_pitch) = self.pitches(ctx);
        trace!(rects = rect_count, lanes, ?direction, "frame pass");

        // Lay out in cell units first, then scale.
        let mut frontier = vec![0usize; lanes];
        let mut cell_pos = Vec::with_capacity(items.len());
        let mut first_leading = vec![usize::MAX; lanes];
        let instances = items.len().div_ceil(rect_count);
        for instance in 0..instances {
            let base = if instance == 0 {
                0
            } else if self.opts.use_frame_fill {
                // Largest lane overhang decides the shift; at least one
                // lane ends up touching the previous instance.
                (0..lanes)
                    .filter(|&lane| template.trailing[lane] > 0)
                    .map(|lane| frontier[lane].saturating_sub(template.leading[lane]))
                    .max()
                    .unwrap_or(instance * template.rows)
            } else {
                instance * template.rows
            };
            let from = instance * rect_count;
            let to = (from + rect_count).min(items.len());
            for index in from..to {
                let rect = template.rects[index - from];
                cell_pos.push((rect, base + rect.content_pos));
            }
            for lane in 0..lanes {
                if template.trailing[lane] > 0 {
                    frontier[lane] = base + template.trailing[lane];
                    if first_leading[lane] == usize::MAX {
                        first_leading[lane] = base + template.leading[lane];
                    }
                }
            }
        }

        // Block origin per lane: appending tucks the block against the
        // seed's far edge, prepending against its near edge. Re-placing a
        // batch over its own start outline lands it back where it was.
        let seed = reseed(outline, lanes, direction);
        let covered = (0..lanes).filter(|&lane| frontier[lane] > 0);
        let origin = match direction {
            Direction::End => covered
                .map(|lane| seed[lane] - first_leading[lane] as f64 * content_pitch)
                .fold(f64::NEG_INFINITY, f64::max),
            Direction::Start => covered
                .map(|lane| seed[lane] - frontier[lane] as f64 * content_pitch)
                .fold(f64::INFINITY, f64::min),
        };
        let origin = if origin.is_finite() { origin } else { seed[0] };

        for (item, (rect, content_cell)) in items.iter_mut().zip(&cell_pos) {
            item.target.inline_pos = rect.inline_pos as f64 * inline_pitch;
            item.target.inline_size = (rect.inline_span as f64 * inline_pitch - gap).max(0.0);
            item.target.content_pos = origin + *content_cell as f64 * content_pitch;
            item.target.content_size =
                (rect.content_span as f64 * content_pitch - gap).max(0.0);
        }

        let mut start = seed.clone();
        let mut end = seed;
        for lane in 0..lanes {
            if frontier[lane] > 0 {
                start[lane] = origin + first_leading[lane] as f64 * content_pitch;
                end[lane] = origin + frontier[lane] as f64 * content_pitch;
            }
        }
        Outline { start, end }
    }
}
