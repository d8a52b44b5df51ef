#![forbid(unsafe_code)]

//! The gridkit orchestration engine.
//!
//! This crate owns everything around the placement strategies: the item
//! list and its identity diffing, the readiness pipeline that decides when
//! items are measured, the debounced render scheduler, and status
//! persistence. It drives a [`PlacementStrategy`](gridkit_layout::PlacementStrategy)
//! but never implements placement math itself.
//!
//! # Control flow
//!
//! ```text
//! host mutation ──► GridEngine (dirty flag + merged options)
//!                      │ tick(now)
//!                      ▼
//!               RenderScheduler ──► render_items
//!                      │                │
//!                      │         content check batch
//!                      ▼                ▼
//!               ContentEvent ──► readiness pipeline ──► placement pass
//!                                                          │
//!                                         outline fit + host.apply
//!                                                          ▼
//!                                              EngineEvent queue
//! ```

pub mod diff;
pub mod engine;
pub mod events;
pub mod scheduler;
pub mod status;

pub use diff::{DiffResult, diff_children};
pub use engine::{EngineOptions, GridEngine, ItemHost, RenderOptions};
pub use events::{ContentEvent, ContentMessage, EngineEvent};
pub use scheduler::RenderScheduler;
pub use status::{GridStatus, StatusError};
