#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two rectangle types exist because the engine speaks two languages:
//! hosts measure and paint in physical coordinates ([`Rect`]), strategies
//! compute in logical inline/content coordinates ([`TargetRect`]). An
//! [`Orientation`] maps one onto the other.

use serde::{Deserialize, Serialize};

/// A raw measured box in physical coordinates.
///
/// `left`/`top` are offsets from the container origin; all fields are
/// non-negative in practice but nothing here enforces it, since raw
/// measurements come from outside.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Check if the rectangle has no measurable area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Size along the inline axis for the given orientation.
    #[inline]
    pub fn inline_size(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.width,
            Orientation::Horizontal => self.height,
        }
    }

    /// Size along the content axis for the given orientation.
    #[inline]
    pub fn content_size(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Vertical => self.height,
            Orientation::Horizontal => self.width,
        }
    }
}

/// A computed placement box in logical coordinates.
///
/// Owned by the active placement strategy while a placement call runs; the
/// engine reads it afterwards to paint.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetRect {
    /// Position across the lanes.
    pub inline_pos: f64,
    /// Position along the placement axis.
    pub content_pos: f64,
    /// Extent across the lanes.
    pub inline_size: f64,
    /// Extent along the placement axis.
    pub content_size: f64,
}

impl TargetRect {
    /// Far edge along the content axis.
    #[inline]
    pub fn content_end(&self) -> f64 {
        self.content_pos + self.content_size
    }

    /// Far edge along the inline axis.
    #[inline]
    pub fn inline_end(&self) -> f64 {
        self.inline_pos + self.inline_size
    }

    /// Convert to physical coordinates.
    #[inline]
    pub fn to_rect(&self, orientation: Orientation) -> Rect {
        match orientation {
            Orientation::Vertical => Rect {
                left: self.inline_pos,
                top: self.content_pos,
                width: self.inline_size,
                height: self.content_size,
            },
            Orientation::Horizontal => Rect {
                left: self.content_pos,
                top: self.inline_pos,
                width: self.content_size,
                height: self.inline_size,
            },
        }
    }

    /// Build from a physical rectangle.
    #[inline]
    pub fn from_rect(rect: &Rect, orientation: Orientation) -> Self {
        match orientation {
            Orientation::Vertical => Self {
                inline_pos: rect.left,
                content_pos: rect.top,
                inline_size: rect.width,
                content_size: rect.height,
            },
            Orientation::Horizontal => Self {
                inline_pos: rect.top,
                content_pos: rect.left,
                inline_size: rect.height,
                content_size: rect.width,
            },
        }
    }
}

/// Which physical axis the content axis maps to.
///
/// `Vertical` is the common web-page case: lanes are distributed across the
/// width and placement grows downwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Inline = width, content = height.
    #[default]
    Vertical,
    /// Inline = height, content = width.
    Horizontal,
}

/// Which end of the frontier new content grows from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Prepend before the frontier's near edge.
    Start,
    /// Append past the frontier's far edge.
    #[default]
    End,
}

impl Direction {
    /// Sign of frontier movement: `+1.0` for [`Direction::End`], `-1.0`
    /// for [`Direction::Start`].
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Start => -1.0,
            Direction::End => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Direction, Orientation, Rect, TargetRect};

    #[test]
    fn rect_axis_sizes_follow_orientation() {
        let rect = Rect::from_size(30.0, 20.0);
        assert_eq!(rect.inline_size(Orientation::Vertical), 30.0);
        assert_eq!(rect.content_size(Orientation::Vertical), 20.0);
        assert_eq!(rect.inline_size(Orientation::Horizontal), 20.0);
        assert_eq!(rect.content_size(Orientation::Horizontal), 30.0);
    }

    #[test]
    fn rect_is_empty() {
        assert!(Rect::from_size(0.0, 10.0).is_empty());
        assert!(Rect::from_size(10.0, 0.0).is_empty());
        assert!(!Rect::from_size(1.0, 1.0).is_empty());
    }

    #[test]
    fn target_round_trips_through_physical() {
        let target = TargetRect {
            inline_pos: 5.0,
            content_pos: 7.0,
            inline_size: 30.0,
            content_size: 20.0,
        };
        for orientation in [Orientation::Vertical, Orientation::Horizontal] {
            let rect = target.to_rect(orientation);
            assert_eq!(TargetRect::from_rect(&rect, orientation), target);
        }
    }

    #[test]
    fn target_edges() {
        let target = TargetRect {
            inline_pos: 5.0,
            content_pos: 7.0,
            inline_size: 30.0,
            content_size: 20.0,
        };
        assert_eq!(target.inline_end(), 35.0);
        assert_eq!(target.content_end(), 27.0);
    }

    #[test]
    fn direction_signs() {
        assert_eq!(Direction::End.sign(), 1.0);
        assert_eq!(Direction::Start.sign(), -1.0);
    }

    #[test]
    fn horizontal_target_swaps_axes() {
        let target = TargetRect {
            inline_pos: 1.0,
            content_pos: 2.0,
            inline_size: 3.0,
            content_size: 4.0,
        };
        let rect = target.to_rect(Orientation::Horizontal);
        assert_eq!(rect.left, 2.0);
        assert_eq!(rect.top, 1.0);
        assert_eq!(rect.width, 4.0);
        assert_eq!(rect.height, 3.0);
    }
}
