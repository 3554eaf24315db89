//! # Stratum Common
//!
//! Foundational types shared across the Stratum world store:
//! - Coordinate spaces (world pixels, tiles, chunks, chunk-local cells)
//!   and the conversions between them
//! - Schema version information for persisted formats

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::version::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_resolution() {
        let world = WorldCoord::new(100, 200);
        let tile = world.to_tile(16);
        assert_eq!(tile, TileCoord::new(6, 12));

        let chunk = tile.to_chunk(32);
        let local = tile.to_local(32);
        assert_eq!(chunk, ChunkCoord::new(0, 0));
        assert_eq!(local, LocalCoord::new(6, 12));
    }

    #[test]
    fn test_version_compatibility() {
        let current = SchemaVersion::new(1, 1, 0);
        let older = SchemaVersion::new(1, 0, 2);
        let next_major = SchemaVersion::new(2, 0, 0);

        assert!(current.can_read(&older));
        assert!(!current.can_read(&next_major));
    }
}
