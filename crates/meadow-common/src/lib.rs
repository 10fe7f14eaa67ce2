//! # Meadow Common
//!
//! Common types shared by the Meadow terrain crates:
//! - Tile, chunk, and rectangle coordinates
//! - Packed 64-bit tile keys for sparse maps
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
}

pub use prelude::*;
