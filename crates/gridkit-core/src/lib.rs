#![forbid(unsafe_code)]

//! Data model for the gridkit layout engine.
//!
//! This crate provides the pieces shared by every placement strategy and by
//! the engine that drives them:
//!
//! - [`Rect`] / [`TargetRect`] - physical measurements and logical placement
//!   output, convertible under an [`Orientation`]
//! - [`GridItem`] - one placeable entity with its measurement and lifecycle
//!   state
//! - [`Outline`] - the per-lane placement frontier threaded between
//!   successive placement batches

pub mod geometry;
pub mod item;
pub mod outline;

pub use geometry::{Direction, Orientation, Rect, TargetRect};
pub use item::{
    DerivedOffsets, GridItem, ItemDirectives, ItemId, MountState, UpdateState,
};
pub use outline::Outline;
