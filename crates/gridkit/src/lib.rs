#![forbid(unsafe_code)]

//! Gridkit public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from internal crates and offers a lightweight
//! prelude for day-to-day usage.

// --- Core re-exports -------------------------------------------------------

pub use gridkit_core::{
    DerivedOffsets, Direction, GridItem, ItemDirectives, ItemId, MountState, Orientation,
    Outline, Rect, TargetRect, UpdateState,
};

// --- Layout re-exports -----------------------------------------------------

pub use gridkit_layout::{
    Frame, FrameOptions, Justified, JustifiedOptions, LayoutContext, Masonry, MasonryAlign,
    MasonryOptions, Packing, PackingOptions, PlacementStrategy, RectSize, WeightPriority,
};

// --- Engine re-exports -----------------------------------------------------

pub use gridkit_engine::{
    ContentEvent, ContentMessage, EngineEvent, EngineOptions, GridEngine, GridStatus,
    ItemHost, RenderOptions, RenderScheduler, StatusError,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Direction, EngineOptions, GridEngine, GridItem, ItemHost, ItemId, Masonry,
        MasonryOptions, Orientation, Outline, PlacementStrategy, Rect, RenderOptions,
        TargetRect,
    };

    pub use crate::{core, engine, layout};
}

pub use gridkit_core as core;
pub use gridkit_engine as engine;
pub use gridkit_layout as layout;
