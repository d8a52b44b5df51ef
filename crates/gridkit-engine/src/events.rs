#![forbid(unsafe_code)]

//! Messages crossing the engine boundary.
//!
//! Inbound, the content-readiness service reports through one message type
//! whose ordering guarantees the pipeline relies on: every item's pre-ready
//! precedes its ready, the global pre-ready follows all per-item pre-ready
//! signals, and ready fires once per item and once globally. Outbound, the
//! engine queues events the host drains after each cycle.

use gridkit_core::{Direction, ItemId};

/// One signal from the content-readiness service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMessage {
    /// The item's natural size became knowable (it may still be loading).
    PreReadyItem(ItemId),
    /// Every item in the batch is pre-ready.
    PreReadyAll,
    /// The item finished loading.
    ReadyItem(ItemId),
    /// The item failed to load.
    ErrorItem(ItemId),
    /// Every item in the batch finished.
    ReadyAll,
}

/// A content signal tagged with the check generation it answers.
///
/// The engine ignores generations other than the current one, which is how
/// superseded in-flight checks are cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentEvent {
    pub generation: u64,
    pub message: ContentMessage,
}

/// Notification queued by the engine for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A placement pass finished and targets were applied.
    RenderComplete {
        direction: Direction,
        /// Items mounted for the first time in this pass.
        mounted: Vec<ItemId>,
        /// Items measured in this pass.
        updated: Vec<ItemId>,
        /// The pass remeasured the container.
        is_resize: bool,
    },
    /// An item's content failed to load. Retrying is re-enqueueing:
    /// `update_items(host, Some(&[id]))`.
    ContentError { id: ItemId },
}
