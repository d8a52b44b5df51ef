#![forbid(unsafe_code)]

//! The grid engine.
//!
//! Owns the item list and the outline, drives the readiness pipeline, and
//! invokes the active placement strategy. The engine is single-threaded
//! and cooperative: it only runs inside calls the host makes, and the only
//! asynchronous boundary is the content-readiness service answering a
//! check through [`ContentEvent`]s.
//!
//! # Readiness pipeline
//!
//! Per item: `NeedsUpdate -> WaitingForContent -> Updated`, re-entrant on
//! any external mutation.
//!
//! | Signal          | Action                                           |
//! |-----------------|--------------------------------------------------|
//! | `PreReadyItem`  | noted; sizes become knowable item by item        |
//! | `PreReadyAll`   | measure the whole batch, place, report           |
//! | `ReadyItem`     | after pre-ready: remeasure that item, place      |
//! | `ErrorItem`     | emit `ContentError` with a retry path, continue  |
//! | `ReadyAll`      | close the batch                                  |
//!
//! Signals carrying a generation other than the current one are ignored;
//! that is how a superseded in-flight check is cancelled.

use std::collections::VecDeque;
use std::time::Instant;

use gridkit_core::{
    Direction, GridItem, ItemDirectives, ItemId, MountState, Orientation, Outline, Rect,
    TargetRect, UpdateState,
};
use gridkit_layout::{LayoutContext, PlacementStrategy};
use tracing::{debug, trace};

use crate::diff::diff_children;
use crate::events::{ContentEvent, ContentMessage, EngineEvent};
use crate::scheduler::RenderScheduler;
use crate::status::GridStatus;

/// Tolerance for "did the container span change" comparisons.
const SPAN_EPSILON: f64 = 1e-6;

/// Services the engine consumes from its host.
///
/// These are the narrow seams to the box measurement/paint service and the
/// content-readiness service; everything behind them (style application,
/// element trees, load observation) is out of the engine's scope.
///
/// `request_content_check` must not call back into the engine; the host
/// answers it later through [`GridEngine::handle_content`].
pub trait ItemHost {
    /// Current container extent across the lanes.
    fn container_inline_size(&mut self) -> f64;

    /// Current raw box of the item's element.
    fn measure(&mut self, id: ItemId) -> Rect;

    /// Paint a computed target box, axis-aware.
    fn apply(&mut self, id: ItemId, target: &TargetRect, orientation: Orientation);

    /// Start an asynchronous readiness check for the given batch.
    fn request_content_check(&mut self, generation: u64, ids: &[ItemId]);
}

/// Engine-level configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    pub orientation: Orientation,
    /// Normalize the outline after each pass so its near edge sits at 0.
    pub use_fit: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            use_fit: true,
        }
    }
}

/// Per-cycle rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub direction: Direction,
    /// Remeasure the container and every item before placing.
    pub use_resize: bool,
}

impl RenderOptions {
    fn merge(&mut self, other: RenderOptions) {
        self.direction = other.direction;
        self.use_resize |= other.use_resize;
    }
}

/// Orchestrator around one [`PlacementStrategy`].
pub struct GridEngine {
    strategy: Box<dyn PlacementStrategy>,
    opts: EngineOptions,
    items: Vec<GridItem>,
    outline: Outline,
    container_inline_size: f64,
    scheduler: RenderScheduler,
    pending: RenderOptions,
    generation: u64,
    batch: Vec<ItemId>,
    batch_options: RenderOptions,
    pre_ready_all: bool,
    events: VecDeque<EngineEvent>,
}

impl GridEngine {
    /// Engine over the given strategy with default scheduling.
    #[must_use]
    pub fn new(strategy: Box<dyn PlacementStrategy>, opts: EngineOptions) -> Self {
        Self::with_scheduler(strategy, opts, RenderScheduler::default())
    }

    /// Engine with explicit scheduler configuration.
    #[must_use]
    pub fn with_scheduler(
        strategy: Box<dyn PlacementStrategy>,
        opts: EngineOptions,
        scheduler: RenderScheduler,
    ) -> Self {
        Self {
            strategy,
            opts,
            items: Vec::new(),
            outline: Outline::default(),
            container_inline_size: 0.0,
            scheduler,
            pending: RenderOptions::default(),
            generation: 0,
            batch: Vec::new(),
            batch_options: RenderOptions::default(),
            pre_ready_all: false,
            events: VecDeque::new(),
        }
    }

    // --- Accessors ---------------------------------------------------------

    #[must_use]
    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Vec<GridItem> {
        &mut self.items
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&GridItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    pub fn set_outline(&mut self, outline: Outline) {
        self.outline = outline;
    }

    /// Last measured container extent across the lanes.
    #[must_use]
    pub fn container_inline_size(&self) -> f64 {
        self.container_inline_size
    }

    /// Container extent along the content axis implied by the outline.
    #[must_use]
    pub fn container_content_size(&self) -> f64 {
        self.outline.content_size(self.strategy.gap())
    }

    /// Next queued notification, if any.
    pub fn poll_event(&mut self) -> Option<EngineEvent> {
        self.events.pop_front()
    }

    /// Replace an item's externally parsed layout hints.
    ///
    /// Returns false when the id is unknown.
    pub fn set_directives(&mut self, id: ItemId, directives: ItemDirectives) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.directives = directives;
                true
            }
            None => false,
        }
    }

    // --- Mutations ---------------------------------------------------------

    /// Reconcile the item list with the host's ordered children.
    ///
    /// Maintained and reordered ids keep their entity; added ids start
    /// fresh in `NeedsUpdate`/`Unchecked`; removed ids are dropped. Any
    /// change schedules a placement cycle. Returns whether one did.
    pub fn sync_elements(&mut self, children: &[ItemId]) -> bool {
        let current: Vec<ItemId> = self.items.iter().map(|item| item.id).collect();
        let result = diff_children(&current, children);
        if result.is_unchanged() {
            return false;
        }
        debug!(
            added = result.added.len(),
            removed = result.removed.len(),
            changed = result.changed.len(),
            "sync elements"
        );
        let mut previous = std::mem::take(&mut self.items);
        self.items = children
            .iter()
            .map(|&id| {
                match previous.iter().position(|item| item.id == id) {
                    Some(index) => previous.swap_remove(index),
                    None => GridItem::new(id),
                }
            })
            .collect();
        self.schedule_render(RenderOptions::default());
        true
    }

    /// Mark the given items (default: all) for re-measurement and
    /// schedule a placement cycle.
    pub fn update_items(&mut self, ids: Option<&[ItemId]>) {
        match ids {
            Some(ids) => {
                for item in &mut self.items {
                    if ids.contains(&item.id) {
                        item.mark_needs_update();
                    }
                }
            }
            None => {
                for item in &mut self.items {
                    item.mark_needs_update();
                }
            }
        }
        self.schedule_render(RenderOptions::default());
    }

    /// Request a coalesced placement cycle.
    pub fn schedule_render(&mut self, options: RenderOptions) {
        self.pending.merge(options);
        self.scheduler.mark();
    }

    /// Drive the debounce clock; runs the pending cycle when due.
    pub fn tick(&mut self, host: &mut dyn ItemHost, now: Instant) -> bool {
        if !self.scheduler.poll(now) {
            return false;
        }
        let options = std::mem::take(&mut self.pending);
        self.render_items(host, options);
        true
    }

    /// Run a placement cycle now.
    ///
    /// With `use_resize` the container and every item are remeasured;
    /// otherwise only pending updates run. Items whose natural size is not
    /// yet knowable go through the content-readiness service and complete
    /// the cycle via [`Self::handle_content`].
    pub fn render_items(&mut self, host: &mut dyn ItemHost, options: RenderOptions) {
        self.scheduler.clear();
        if options.use_resize || self.container_inline_size <= 0.0 {
            self.container_inline_size = host.container_inline_size();
        }
        if options.use_resize {
            for item in &mut self.items {
                item.mark_needs_update();
            }
        } else {
            // Sizes forced by the previous pass invalidate the measurement.
            for item in &mut self.items {
                if item.should_reupdate {
                    item.mark_needs_update();
                }
            }
        }

        let batch: Vec<ItemId> = self
            .items
            .iter()
            .filter(|item| item.update_state == UpdateState::NeedsUpdate)
            .map(|item| item.id)
            .collect();
        if batch.is_empty() {
            // Nothing to measure; re-place with current measurements.
            self.placement_pass(host, options, Vec::new());
            return;
        }
        debug!(batch = batch.len(), generation = self.generation + 1, "content check");
        self.generation += 1;
        self.pre_ready_all = false;
        self.batch = batch;
        self.batch_options = options;
        for item in &mut self.items {
            if self.batch.contains(&item.id) {
                item.update_state = UpdateState::WaitingForContent;
            }
        }
        host.request_content_check(self.generation, &self.batch);
    }

    /// Feed one signal from the content-readiness service.
    pub fn handle_content(&mut self, host: &mut dyn ItemHost, event: ContentEvent) {
        if event.generation != self.generation {
            trace!(
                generation = event.generation,
                current = self.generation,
                "stale content signal ignored"
            );
            return;
        }
        match event.message {
            ContentMessage::PreReadyItem(id) => {
                trace!(id = id.get(), "pre-ready");
            }
            ContentMessage::PreReadyAll => {
                // Items reset by an external mutation since the check began
                // stay out; their new cycle remeasures them.
                let batch: Vec<ItemId> = self
                    .batch
                    .iter()
                    .copied()
                    .filter(|&id| {
                        self.item(id)
                            .is_some_and(|item| {
                                item.update_state == UpdateState::WaitingForContent
                            })
                    })
                    .collect();
                for &id in &batch {
                    self.measure_item(host, id);
                }
                self.pre_ready_all = true;
                let options = self.batch_options;
                self.placement_pass(host, options, batch);
            }
            ContentMessage::ReadyItem(id) => {
                if !self.pre_ready_all {
                    // The batch-wide pre-ready measurement will cover it.
                    return;
                }
                let known = self
                    .item(id)
                    .is_some_and(|item| item.update_state == UpdateState::Updated);
                if !known {
                    // Reset by an external mutation since the check began.
                    return;
                }
                self.measure_item(host, id);
                let options = RenderOptions {
                    direction: self.batch_options.direction,
                    use_resize: false,
                };
                self.placement_pass(host, options, vec![id]);
            }
            ContentMessage::ErrorItem(id) => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                    // Siblings keep going; the host may retry this one.
                    item.update_state = UpdateState::Updated;
                }
                self.events.push_back(EngineEvent::ContentError { id });
            }
            ContentMessage::ReadyAll => {
                self.batch.clear();
            }
        }
    }

    // --- Persistence -------------------------------------------------------

    /// Snapshot the outline and per-item state.
    #[must_use]
    pub fn status(&self) -> GridStatus {
        GridStatus {
            container_inline_size: self.container_inline_size,
            outline: self.outline.clone(),
            items: self.items.clone(),
        }
    }

    /// Restore a snapshot.
    ///
    /// When the container's measured span still matches, items are painted
    /// straight from their saved targets; otherwise the snapshot only
    /// seeds identities and a full relayout is scheduled.
    pub fn set_status(&mut self, host: &mut dyn ItemHost, status: GridStatus) {
        let measured = host.container_inline_size();
        let span_changed =
            (measured - status.container_inline_size).abs() > SPAN_EPSILON;
        self.items = status.items;
        self.outline = status.outline;
        self.container_inline_size = measured;
        if span_changed {
            debug!(
                saved = status.container_inline_size,
                measured, "container span changed; forcing relayout"
            );
            self.outline = Outline::default();
            for item in &mut self.items {
                item.mark_needs_update();
            }
            self.schedule_render(RenderOptions {
                use_resize: true,
                ..RenderOptions::default()
            });
            return;
        }
        let orientation = self.opts.orientation;
        for item in &mut self.items {
            host.apply(item.id, &item.target, orientation);
            item.mount_state = MountState::Mounted;
            item.update_state = UpdateState::Updated;
        }
    }

    // --- Internals ---------------------------------------------------------

    /// Measure one item, honoring size-group equalization.
    fn measure_item(&mut self, host: &mut dyn ItemHost, id: ItemId) {
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            return;
        };
        let mut rect = host.measure(id);
        let directives = self.items[index].directives.clone();
        if let Some(group) = directives.size_group
            && !directives.no_equalize
        {
            // The group's first measured member defines the rect.
            let leader = self.items.iter().find(|item| {
                item.id != id
                    && item.directives.size_group == Some(group)
                    && !item.rect.is_empty()
            });
            if let Some(leader) = leader {
                rect = leader.rect;
            }
        }
        let item = &mut self.items[index];
        item.record_measurement(rect);
        item.update_state = UpdateState::Updated;
    }

    /// One placement pass over every measured item.
    ///
    /// Seeded from the side of the stored outline opposite the direction,
    /// so re-running a pass with unchanged measurements reproduces the
    /// same outline and targets.
    fn placement_pass(
        &mut self,
        host: &mut dyn ItemHost,
        options: RenderOptions,
        updated: Vec<ItemId>,
    ) {
        let direction = options.direction;
        let ctx = LayoutContext {
            container_inline_size: self.container_inline_size,
            orientation: self.opts.orientation,
        };
        let indices: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.update_state == UpdateState::Updated)
            .map(|(index, _)| index)
            .collect();
        let seed = match direction {
            Direction::End => self.outline.start.clone(),
            Direction::Start => self.outline.end.clone(),
        };
        let mut batch: Vec<GridItem> =
            indices.iter().map(|&index| self.items[index].clone()).collect();
        let mut next = self
            .strategy
            .place(&ctx, &mut batch, direction, &seed);
        if self.opts.use_fit {
            next.fit(&mut batch, false);
        }
        trace!(
            placed = batch.len(),
            lanes = next.lane_count(),
            content = next.content_size(self.strategy.gap()),
            "placement pass"
        );
        self.outline = next;

        let orientation = self.opts.orientation;
        let mut mounted = Vec::new();
        for (&index, item) in indices.iter().zip(batch) {
            self.items[index] = item;
            let item = &mut self.items[index];
            host.apply(item.id, &item.target, orientation);
            if item.mount_state != MountState::Mounted {
                item.mount_state = MountState::Mounted;
                mounted.push(item.id);
            }
        }
        self.events.push_back(EngineEvent::RenderComplete {
            direction,
            mounted,
            updated,
            is_resize: options.use_resize,
        });
    }
}

impl std::fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridEngine")
            .field("items", &self.items.len())
            .field("lanes", &self.outline.lane_count())
            .field("container_inline_size", &self.container_inline_size)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use gridkit_layout::{Masonry, MasonryOptions};

    struct FakeHost {
        container: f64,
        sizes: HashMap<ItemId, Rect>,
        applied: Vec<(ItemId, TargetRect)>,
        checks: Vec<(u64, Vec<ItemId>)>,
    }

    impl FakeHost {
        fn new(container: f64) -> Self {
            Self {
                container,
                sizes: HashMap::new(),
                applied: Vec::new(),
                checks: Vec::new(),
            }
        }

        fn set_size(&mut self, raw: u64, width: f64, height: f64) {
            self.sizes.insert(id(raw), Rect::from_size(width, height));
        }
    }

    impl ItemHost for FakeHost {
        fn container_inline_size(&mut self) -> f64 {
            self.container
        }

        fn measure(&mut self, id: ItemId) -> Rect {
            self.sizes.get(&id).copied().unwrap_or_default()
        }

        fn apply(&mut self, id: ItemId, target: &TargetRect, _orientation: Orientation) {
            self.applied.push((id, *target));
        }

        fn request_content_check(&mut self, generation: u64, ids: &[ItemId]) {
            self.checks.push((generation, ids.to_vec()));
        }
    }

    fn id(raw: u64) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    fn masonry_engine(columns: usize) -> GridEngine {
        let strategy = Masonry::new(MasonryOptions {
            column: columns,
            ..MasonryOptions::default()
        });
        GridEngine::new(Box::new(strategy), EngineOptions::default())
    }

    /// Answer the latest outstanding content check as fully ready.
    fn answer_check(engine: &mut GridEngine, host: &mut FakeHost) {
        let (generation, ids) = host.checks.last().cloned().unwrap();
        for &item in &ids {
            engine.handle_content(
                host,
                ContentEvent {
                    generation,
                    message: ContentMessage::PreReadyItem(item),
                },
            );
        }
        engine.handle_content(
            host,
            ContentEvent {
                generation,
                message: ContentMessage::PreReadyAll,
            },
        );
        engine.handle_content(
            host,
            ContentEvent {
                generation,
                message: ContentMessage::ReadyAll,
            },
        );
    }

    #[test]
    fn full_cycle_measures_places_and_mounts() {
        let mut host = FakeHost::new(600.0);
        for raw in 1..=4 {
            host.set_size(raw, 300.0, 200.0);
        }
        let mut engine = masonry_engine(2);
        assert!(engine.sync_elements(&[id(1), id(2), id(3), id(4)]));

        engine.render_items(&mut host, RenderOptions::default());
        assert_eq!(host.checks.len(), 1);
        assert_eq!(host.checks[0].0, 1);
        assert_eq!(host.checks[0].1.len(), 4);
        assert!(
            engine
                .items()
                .iter()
                .all(|item| item.update_state == UpdateState::WaitingForContent)
        );

        answer_check(&mut engine, &mut host);
        let tops: Vec<f64> = engine.items().iter().map(|i| i.target.content_pos).collect();
        let lanes: Vec<f64> = engine.items().iter().map(|i| i.target.inline_pos).collect();
        assert_eq!(tops, vec![0.0, 0.0, 200.0, 200.0]);
        assert_eq!(lanes, vec![0.0, 300.0, 0.0, 300.0]);
        assert_eq!(engine.outline().end, vec![400.0, 400.0]);
        assert_eq!(host.applied.len(), 4);

        match engine.poll_event() {
            Some(EngineEvent::RenderComplete {
                mounted, updated, is_resize, ..
            }) => {
                assert_eq!(mounted.len(), 4);
                assert_eq!(updated.len(), 4);
                assert!(!is_resize);
            }
            other => panic!("expected render completion, got {other:?}"),
        }
        assert!(engine.poll_event().is_none());
    }

    #[test]
    fn re_render_without_changes_is_idempotent() {
        let mut host = FakeHost::new(600.0);
        for raw in 1..=4 {
            host.set_size(raw, 300.0, 200.0);
        }
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2), id(3), id(4)]);
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);
        let first_outline = engine.outline().clone();
        let first_targets: Vec<TargetRect> =
            engine.items().iter().map(|item| item.target).collect();

        engine.render_items(&mut host, RenderOptions::default());
        // No new measurement, and the geometry does not drift.
        assert_eq!(host.checks.len(), 1);
        assert_eq!(engine.outline(), &first_outline);
        let second_targets: Vec<TargetRect> =
            engine.items().iter().map(|item| item.target).collect();
        assert_eq!(second_targets, first_targets);
    }

    #[test]
    fn stale_generation_is_ignored() {
        let mut host = FakeHost::new(600.0);
        host.set_size(1, 300.0, 200.0);
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1)]);
        engine.render_items(&mut host, RenderOptions::default());

        engine.update_items(None);
        engine.render_items(&mut host, RenderOptions::default());
        assert_eq!(host.checks.len(), 2);

        // The first check's answer arrives late and must do nothing.
        engine.handle_content(
            &mut host,
            ContentEvent {
                generation: 1,
                message: ContentMessage::PreReadyAll,
            },
        );
        assert!(engine.poll_event().is_none());
        assert_eq!(
            engine.items()[0].update_state,
            UpdateState::WaitingForContent
        );

        answer_check(&mut engine, &mut host);
        assert_eq!(engine.items()[0].update_state, UpdateState::Updated);
    }

    #[test]
    fn late_ready_remeasures_one_item() {
        let mut host = FakeHost::new(600.0);
        host.set_size(1, 300.0, 200.0);
        host.set_size(2, 300.0, 200.0);
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2)]);
        engine.render_items(&mut host, RenderOptions::default());
        let generation = host.checks.last().unwrap().0;
        engine.handle_content(
            &mut host,
            ContentEvent {
                generation,
                message: ContentMessage::PreReadyAll,
            },
        );
        assert!(matches!(
            engine.poll_event(),
            Some(EngineEvent::RenderComplete { .. })
        ));

        // The item's final size arrives after the provisional pass.
        host.set_size(2, 300.0, 350.0);
        engine.handle_content(
            &mut host,
            ContentEvent {
                generation,
                message: ContentMessage::ReadyItem(id(2)),
            },
        );
        match engine.poll_event() {
            Some(EngineEvent::RenderComplete { updated, .. }) => {
                assert_eq!(updated, vec![id(2)]);
            }
            other => panic!("expected render completion, got {other:?}"),
        }
        assert_eq!(engine.item(id(2)).unwrap().rect.height, 350.0);
        assert_eq!(engine.outline().end, vec![200.0, 350.0]);
    }

    #[test]
    fn content_error_is_reported_and_retryable() {
        let mut host = FakeHost::new(600.0);
        host.set_size(1, 300.0, 200.0);
        host.set_size(2, 300.0, 200.0);
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2)]);
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);
        assert!(matches!(
            engine.poll_event(),
            Some(EngineEvent::RenderComplete { .. })
        ));

        let (generation, _) = host.checks.last().cloned().unwrap();
        engine.handle_content(
            &mut host,
            ContentEvent {
                generation,
                message: ContentMessage::ErrorItem(id(2)),
            },
        );
        assert_eq!(
            engine.poll_event(),
            Some(EngineEvent::ContentError { id: id(2) })
        );

        // Retry is just re-enqueueing the item.
        engine.update_items(Some(&[id(2)]));
        engine.render_items(&mut host, RenderOptions::default());
        let (_, ids) = host.checks.last().unwrap();
        assert_eq!(ids.as_slice(), &[id(2)]);
    }

    #[test]
    fn resize_remeasures_everything() {
        let mut host = FakeHost::new(600.0);
        host.set_size(1, 300.0, 200.0);
        host.set_size(2, 300.0, 200.0);
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2)]);
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);
        engine.poll_event();

        host.container = 900.0;
        engine.render_items(
            &mut host,
            RenderOptions {
                use_resize: true,
                ..RenderOptions::default()
            },
        );
        assert_eq!(engine.container_inline_size(), 900.0);
        let (_, ids) = host.checks.last().unwrap();
        assert_eq!(ids.len(), 2);
        answer_check(&mut engine, &mut host);
        match engine.poll_event() {
            Some(EngineEvent::RenderComplete { is_resize, .. }) => assert!(is_resize),
            other => panic!("expected render completion, got {other:?}"),
        }
    }

    #[test]
    fn size_group_members_share_the_first_measurement() {
        let mut host = FakeHost::new(600.0);
        host.set_size(1, 300.0, 200.0);
        host.set_size(2, 300.0, 500.0);
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2)]);
        for raw in 1..=2 {
            engine.set_directives(
                id(raw),
                ItemDirectives {
                    size_group: Some(7),
                    ..ItemDirectives::default()
                },
            );
        }
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);
        assert_eq!(engine.item(id(2)).unwrap().rect, Rect::from_size(300.0, 200.0));
        assert_eq!(engine.outline().end, vec![200.0, 200.0]);
    }

    #[test]
    fn sync_keeps_entities_across_reorder_and_removal() {
        let mut host = FakeHost::new(600.0);
        for raw in 1..=3 {
            host.set_size(raw, 300.0, 100.0 * raw as f64);
        }
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2), id(3)]);
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);

        assert!(engine.sync_elements(&[id(3), id(1)]));
        assert_eq!(engine.items().len(), 2);
        assert_eq!(engine.items()[0].id, id(3));
        // Entity survives the move with its baseline measurement.
        assert_eq!(engine.items()[0].org_rect, Rect::from_size(300.0, 300.0));
        assert_eq!(engine.items()[0].update_state, UpdateState::Updated);
        assert!(!engine.sync_elements(&[id(3), id(1)]));
    }

    #[test]
    fn tick_debounces_until_due() {
        let mut host = FakeHost::new(600.0);
        host.set_size(1, 300.0, 200.0);
        let mut engine = GridEngine::with_scheduler(
            Box::new(Masonry::new(MasonryOptions {
                column: 2,
                ..MasonryOptions::default()
            })),
            EngineOptions::default(),
            RenderScheduler::new(Duration::from_millis(16), None),
        );
        engine.sync_elements(&[id(1)]);
        let t0 = Instant::now();
        assert!(!engine.tick(&mut host, t0));
        assert!(host.checks.is_empty());
        assert!(engine.tick(&mut host, t0 + Duration::from_millis(16)));
        assert_eq!(host.checks.len(), 1);
        assert!(!engine.tick(&mut host, t0 + Duration::from_millis(32)));
    }

    #[test]
    fn restore_with_matching_span_paints_saved_targets() {
        let mut host = FakeHost::new(600.0);
        for raw in 1..=2 {
            host.set_size(raw, 300.0, 200.0);
        }
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2)]);
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);
        let status = engine.status();

        let mut restored_host = FakeHost::new(600.0);
        let mut restored = masonry_engine(2);
        restored.set_status(&mut restored_host, status.clone());
        assert_eq!(restored_host.applied.len(), 2);
        assert_eq!(restored.outline(), &status.outline);
        assert!(restored_host.checks.is_empty());
        assert!(
            restored
                .items()
                .iter()
                .all(|item| item.update_state == UpdateState::Updated)
        );
    }

    #[test]
    fn restore_under_a_new_span_forces_relayout() {
        let mut host = FakeHost::new(600.0);
        for raw in 1..=2 {
            host.set_size(raw, 300.0, 200.0);
        }
        let mut engine = masonry_engine(2);
        engine.sync_elements(&[id(1), id(2)]);
        engine.render_items(&mut host, RenderOptions::default());
        answer_check(&mut engine, &mut host);
        let status = engine.status();

        let mut restored_host = FakeHost::new(900.0);
        restored_host.set_size(1, 450.0, 200.0);
        restored_host.set_size(2, 450.0, 200.0);
        let mut restored = masonry_engine(2);
        restored.set_status(&mut restored_host, status);
        assert!(restored_host.applied.is_empty());
        assert!(restored.outline().start.is_empty());

        let t0 = Instant::now();
        restored.tick(&mut restored_host, t0);
        assert!(restored.tick(&mut restored_host, t0 + Duration::from_millis(200)));
        let (_, ids) = restored_host.checks.last().unwrap();
        assert_eq!(ids.len(), 2);
    }
}
