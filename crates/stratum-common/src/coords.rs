//! Coordinate types for world, tile, chunk, and chunk-local positions.
//!
//! Four distinct spaces are in play:
//! - **World** coordinates: pixel positions, `i64`.
//! - **Tile** coordinates: integer tile indices, unbounded and signed.
//! - **Chunk** coordinates: integer chunk indices, unbounded and signed.
//! - **Local** coordinates: a cell within one chunk, `[0, chunk_size)`.
//!
//! All conversions floor toward negative infinity (`div_euclid` /
//! `rem_euclid`), never truncate, so negative positions resolve to the
//! correct chunk and a non-negative local cell. These methods are the single
//! source of truth for space conversion; nothing else reimplements the
//! arithmetic.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// World coordinate in pixels (global position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct WorldCoord {
    /// X coordinate in world space
    pub x: i64,
    /// Y coordinate in world space
    pub y: i64,
}

impl WorldCoord {
    /// Creates a new world coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts to the tile coordinate containing this pixel.
    #[must_use]
    pub const fn to_tile(self, tile_size: u32) -> TileCoord {
        let size = tile_size as i64;
        TileCoord {
            x: self.x.div_euclid(size),
            y: self.y.div_euclid(size),
        }
    }

    /// Converts directly to the chunk coordinate containing this pixel.
    #[must_use]
    pub const fn to_chunk(self, chunk_size: u32, tile_size: u32) -> ChunkCoord {
        let span = chunk_size as i64 * tile_size as i64;
        ChunkCoord {
            x: self.x.div_euclid(span) as i32,
            y: self.y.div_euclid(span) as i32,
        }
    }
}

/// Tile coordinate (identifies a cell in the infinite world grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct TileCoord {
    /// X coordinate in tile space
    pub x: i64,
    /// Y coordinate in tile space
    pub y: i64,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Converts to the chunk coordinate containing this tile.
    #[must_use]
    pub const fn to_chunk(self, chunk_size: u32) -> ChunkCoord {
        let size = chunk_size as i64;
        ChunkCoord {
            x: self.x.div_euclid(size) as i32,
            y: self.y.div_euclid(size) as i32,
        }
    }

    /// Converts to the cell position within its chunk. Always non-negative.
    #[must_use]
    pub const fn to_local(self, chunk_size: u32) -> LocalCoord {
        let size = chunk_size as i64;
        LocalCoord {
            x: self.x.rem_euclid(size) as u16,
            y: self.y.rem_euclid(size) as u16,
        }
    }

    /// Converts to the world coordinate of this tile's top-left pixel.
    #[must_use]
    pub const fn to_world(self, tile_size: u32) -> WorldCoord {
        let size = tile_size as i64;
        WorldCoord {
            x: self.x * size,
            y: self.y * size,
        }
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct ChunkCoord {
    /// X coordinate in chunk space
    pub x: i32,
    /// Y coordinate in chunk space
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the tile coordinate of this chunk's top-left cell.
    #[must_use]
    pub const fn base_tile(self, chunk_size: u32) -> TileCoord {
        let size = chunk_size as i64;
        TileCoord {
            x: self.x as i64 * size,
            y: self.y as i64 * size,
        }
    }

    /// Chebyshev (chessboard) distance to another chunk coordinate.
    ///
    /// Governs the square load/unload regions around the streaming center.
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dy = (self.y as i64 - other.y as i64).unsigned_abs();
        if dx > dy {
            dx as u32
        } else {
            dy as u32
        }
    }
}

/// Local coordinate within a chunk (0 to chunk_size - 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct LocalCoord {
    /// X coordinate within chunk
    pub x: u16,
    /// Y coordinate within chunk
    pub y: u16,
}

impl LocalCoord {
    /// Creates a new local coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Converts to a linear index for array access.
    #[must_use]
    pub const fn to_index(self, chunk_size: u32) -> usize {
        (self.y as usize) * (chunk_size as usize) + (self.x as usize)
    }

    /// Creates from a linear index.
    #[must_use]
    pub const fn from_index(index: usize, chunk_size: u32) -> Self {
        let size = chunk_size as usize;
        Self {
            x: (index % size) as u16,
            y: (index / size) as u16,
        }
    }

    /// Whether both components are inside a `chunk_size` square grid.
    #[must_use]
    pub const fn in_bounds(self, chunk_size: u32) -> bool {
        (self.x as u32) < chunk_size && (self.y as u32) < chunk_size
    }
}

/// Axis-aligned world-space rectangle, used for chunk range queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRect {
    /// Top-left corner (inclusive)
    pub min: WorldCoord,
    /// Bottom-right corner (inclusive)
    pub max: WorldCoord,
}

impl WorldRect {
    /// Creates a rectangle from two corners, normalizing their order.
    #[must_use]
    pub fn new(a: WorldCoord, b: WorldCoord) -> Self {
        Self {
            min: WorldCoord::new(a.x.min(b.x), a.y.min(b.y)),
            max: WorldCoord::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Inclusive range of chunk coordinates this rectangle touches.
    #[must_use]
    pub const fn chunk_span(self, chunk_size: u32, tile_size: u32) -> (ChunkCoord, ChunkCoord) {
        (
            self.min.to_chunk(chunk_size, tile_size),
            self.max.to_chunk(chunk_size, tile_size),
        )
    }

    /// Whether a chunk coordinate falls within the rectangle's chunk span.
    #[must_use]
    pub const fn contains_chunk(self, coord: ChunkCoord, chunk_size: u32, tile_size: u32) -> bool {
        let (lo, hi) = self.chunk_span(chunk_size, tile_size);
        coord.x >= lo.x && coord.x <= hi.x && coord.y >= lo.y && coord.y <= hi.y
    }
}
