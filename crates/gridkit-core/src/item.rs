#![forbid(unsafe_code)]

//! Placeable items and their lifecycle state.
//!
//! A [`GridItem`] persists across relayouts by identity, not by position in
//! the item list. The engine owns every field except `target`, which the
//! active placement strategy writes during a placement call, and
//! `directives`, which an external attribute reader fills in.

use serde::{Deserialize, Serialize};

use crate::geometry::{Orientation, Rect, TargetRect};

/// Stable identity for a grid item, assigned by the host.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Lowest valid item ID.
    pub const MIN: Self = Self(1);

    /// Create an item ID. Returns `None` for the reserved value `0`.
    #[inline]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Get the raw numeric value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Whether the item's element is attached to the host surface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MountState {
    /// Never seen by a placement cycle.
    #[default]
    Unchecked,
    /// Seen, currently detached.
    Unmounted,
    /// Attached and painted at least once.
    Mounted,
}

/// Where the item sits in the measure/place pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UpdateState {
    /// Must be measured and placed in the next cycle.
    #[default]
    NeedsUpdate,
    /// Natural size not yet knowable; waiting on the content service.
    WaitingForContent,
    /// Measured and placed.
    Updated,
}

/// Per-item layout hints parsed by an external attribute reader.
///
/// All fields are optional; strategies fall back to measured sizes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDirectives {
    /// Explicit lane span (masonry).
    pub column_span: Option<u32>,
    /// Upper bound when the strategy grows a span to smooth edges.
    pub max_column_span: Option<u32>,
    /// Items sharing a group adopt the first member's measurement.
    pub size_group: Option<u64>,
    /// Opt out of size-group equalization.
    pub no_equalize: bool,
    /// Non-scaling border along the inline axis (justified).
    pub inline_offset: Option<f64>,
    /// Non-scaling border along the content axis (justified).
    pub content_offset: Option<f64>,
}

/// Engine-owned cache of resolved axis offsets.
///
/// Survives across placements for the same item identity so the justified
/// strategy does not re-resolve directives every pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedOffsets {
    pub inline: f64,
    pub content: f64,
}

/// One placeable entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridItem {
    /// Identity across relayouts.
    pub id: ItemId,
    /// First stable measurement; the ratio/size baseline. Written once by
    /// the readiness pipeline on the item's first update.
    pub org_rect: Rect,
    /// Latest raw measurement.
    pub rect: Rect,
    /// Placement output; owned by the active strategy during a call.
    pub target: TargetRect,
    pub mount_state: MountState,
    pub update_state: UpdateState,
    /// Set when a strategy forcibly changed the item's size, so the next
    /// cycle must remeasure it.
    pub should_reupdate: bool,
    pub directives: ItemDirectives,
    pub derived: DerivedOffsets,
}

impl GridItem {
    /// Create a fresh item awaiting its first measurement.
    #[must_use]
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            org_rect: Rect::default(),
            rect: Rect::default(),
            target: TargetRect::default(),
            mount_state: MountState::Unchecked,
            update_state: UpdateState::NeedsUpdate,
            should_reupdate: false,
            directives: ItemDirectives::default(),
            derived: DerivedOffsets::default(),
        }
    }

    /// Create a fresh item carrying pre-parsed directives.
    #[must_use]
    pub fn with_directives(id: ItemId, directives: ItemDirectives) -> Self {
        Self {
            directives,
            ..Self::new(id)
        }
    }

    /// Measured inline size, falling back to the baseline measurement when
    /// the latest one is degenerate.
    #[inline]
    pub fn inline_size(&self, orientation: Orientation) -> f64 {
        let size = self.rect.inline_size(orientation);
        if size > 0.0 {
            size
        } else {
            self.org_rect.inline_size(orientation)
        }
    }

    /// Measured content size, with the same fallback as [`Self::inline_size`].
    #[inline]
    pub fn content_size(&self, orientation: Orientation) -> f64 {
        let size = self.rect.content_size(orientation);
        if size > 0.0 {
            size
        } else {
            self.org_rect.content_size(orientation)
        }
    }

    /// Baseline inline/content ratio; 0 when the baseline is degenerate.
    #[inline]
    pub fn org_ratio(&self, orientation: Orientation) -> f64 {
        let content = self.org_rect.content_size(orientation);
        if content <= 0.0 {
            0.0
        } else {
            self.org_rect.inline_size(orientation) / content
        }
    }

    /// Put the item back at the start of the pipeline.
    pub fn mark_needs_update(&mut self) {
        self.update_state = UpdateState::NeedsUpdate;
        self.should_reupdate = false;
    }

    /// Record a raw measurement, capturing the baseline on first update.
    pub fn record_measurement(&mut self, rect: Rect) {
        if self.org_rect.is_empty() && !rect.is_empty() {
            self.org_rect = rect;
        }
        self.rect = rect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Orientation;

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    #[test]
    fn item_id_rejects_zero() {
        assert!(ItemId::new(0).is_none());
        assert_eq!(ItemId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn new_item_needs_update_and_is_unchecked() {
        let item = GridItem::new(id(1));
        assert_eq!(item.update_state, UpdateState::NeedsUpdate);
        assert_eq!(item.mount_state, MountState::Unchecked);
        assert!(!item.should_reupdate);
    }

    #[test]
    fn first_measurement_sets_baseline_once() {
        let mut item = GridItem::new(id(1));
        item.record_measurement(Rect::from_size(300.0, 200.0));
        assert_eq!(item.org_rect, Rect::from_size(300.0, 200.0));

        item.record_measurement(Rect::from_size(150.0, 100.0));
        assert_eq!(item.org_rect, Rect::from_size(300.0, 200.0));
        assert_eq!(item.rect, Rect::from_size(150.0, 100.0));
    }

    #[test]
    fn empty_measurement_does_not_claim_baseline() {
        let mut item = GridItem::new(id(1));
        item.record_measurement(Rect::from_size(0.0, 0.0));
        assert!(item.org_rect.is_empty());

        item.record_measurement(Rect::from_size(120.0, 80.0));
        assert_eq!(item.org_rect, Rect::from_size(120.0, 80.0));
    }

    #[test]
    fn sizes_fall_back_to_baseline() {
        let mut item = GridItem::new(id(1));
        item.record_measurement(Rect::from_size(300.0, 200.0));
        item.rect = Rect::default();
        assert_eq!(item.inline_size(Orientation::Vertical), 300.0);
        assert_eq!(item.content_size(Orientation::Vertical), 200.0);
    }

    #[test]
    fn org_ratio_guards_zero_content() {
        let mut item = GridItem::new(id(1));
        assert_eq!(item.org_ratio(Orientation::Vertical), 0.0);
        item.record_measurement(Rect::from_size(300.0, 200.0));
        assert_eq!(item.org_ratio(Orientation::Vertical), 1.5);
    }

    #[test]
    fn mark_needs_update_clears_reupdate_flag() {
        let mut item = GridItem::new(id(1));
        item.update_state = UpdateState::Updated;
        item.should_reupdate = true;
        item.mark_needs_update();
        assert_eq!(item.update_state, UpdateState::NeedsUpdate);
        assert!(!item.should_reupdate);
    }
}
