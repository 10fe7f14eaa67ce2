//! # Meadow World
//!
//! Terrain for an unbounded isometric tile plane.
//!
//! This crate handles:
//! - Seeded noise sampling and land/water classification
//! - Small-cluster suppression and autotile variant selection
//! - Deterministic chunk generation with a padding margin
//! - Viewport-driven chunk streaming with render hooks
//! - The isometric tile ↔ world transform

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod classifier;
pub mod config;
pub mod generation;
pub mod map_data;
pub mod noise_field;
pub mod projection;
pub mod streaming;
pub mod terrain;

/// Result type for world operations.
pub type WorldResult<T> = meadow_common::MeadowResult<T>;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::classifier::*;
    pub use crate::config::*;
    pub use crate::generation::*;
    pub use crate::map_data::*;
    pub use crate::noise_field::*;
    pub use crate::projection::*;
    pub use crate::streaming::*;
    pub use crate::terrain::*;
    pub use crate::WorldResult;
}

pub use prelude::*;
