#![forbid(unsafe_code)]

//! Status persistence.
//!
//! A [`GridStatus`] captures everything needed to reproduce the current
//! layout without re-running the readiness pipeline: the container span it
//! was computed against, the outline, and the full per-item state. The
//! snapshot is plain data and serializes to JSON for storage by the host,
//! typically across navigation or process restarts.

use std::fmt;

use gridkit_core::{GridItem, Outline};
use serde::{Deserialize, Serialize};

/// Serializable snapshot of an engine's layout state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridStatus {
    /// Container span the snapshot was computed against. A restore under a
    /// different span discards the geometry and relayouts from scratch.
    pub container_inline_size: f64,
    pub outline: Outline,
    pub items: Vec<GridItem>,
}

impl GridStatus {
    /// Serialize the snapshot to JSON.
    pub fn to_json(&self) -> Result<String, StatusError> {
        serde_json::to_string(self).map_err(StatusError::Encode)
    }

    /// Deserialize a snapshot from JSON.
    pub fn from_json(raw: &str) -> Result<Self, StatusError> {
        serde_json::from_str(raw).map_err(StatusError::Decode)
    }
}

/// Error serializing or deserializing a [`GridStatus`].
#[derive(Debug)]
pub enum StatusError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode grid status: {err}"),
            Self::Decode(err) => write!(f, "failed to decode grid status: {err}"),
        }
    }
}

impl std::error::Error for StatusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}
