//! # Stratum World
//!
//! Sparse, chunk-paged 2D tile world store with distance-based residency:
//! - Fixed-size tile chunks loaded around a moving reference point
//! - On-demand chunk production: persisted state first, procedural
//!   generation as fallback
//! - Radius-based eviction with dirty write-back
//! - World-coordinate tile access through the [`TileMap`] facade

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod chunk;
pub mod generation;
pub mod persistence;
pub mod registry;
pub mod store;
pub mod tile;
pub mod tilemap;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::chunk::*;
    pub use crate::generation::*;
    pub use crate::persistence::*;
    pub use crate::registry::*;
    pub use crate::store::*;
    pub use crate::tile::*;
    pub use crate::tilemap::*;
}

pub use prelude::*;
