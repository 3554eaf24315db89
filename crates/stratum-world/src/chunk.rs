//! Chunk data structure and serialization.

use serde::{Deserialize, Serialize};
use stratum_common::{ChunkCoord, LocalCoord, MagicBytes, SchemaVersion};
use thiserror::Error;

use crate::tile::{Tile, TileKind};

/// Chunk edge length in tiles.
pub const CHUNK_SIZE: u32 = 32;

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 16;

/// Number of tiles in one chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Chunk errors.
#[derive(Debug, Error)]
pub enum ChunkError {
    /// Serialization failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
    /// Deserialization failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),
    /// Invalid magic bytes
    #[error("Invalid chunk format")]
    InvalidFormat,
    /// Version mismatch
    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version
        actual: String,
    },
    /// Compression failed
    #[error("Compression failed: {0}")]
    CompressionFailed(String),
    /// Unknown tile kind ID in stored data
    #[error("Unknown tile kind ID: {0}")]
    UnknownTileKind(u16),
}

/// Result type for chunk operations.
pub type ChunkResult<T> = Result<T, ChunkError>;

/// Chunk header for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkHeader {
    /// Magic bytes for format identification
    pub magic: [u8; 4],
    /// Schema version
    pub version: SchemaVersion,
    /// Chunk X coordinate
    pub x: i32,
    /// Chunk Y coordinate
    pub y: i32,
    /// Chunk edge length in tiles
    pub size: u32,
    /// Compression type (0 = none, 1 = lz4)
    pub compression: u8,
}

impl ChunkHeader {
    /// Creates a new header.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            magic: MagicBytes::CHUNK.0,
            version: SchemaVersion::CHUNK_FORMAT,
            x: coord.x,
            y: coord.y,
            size: CHUNK_SIZE,
            compression: 1, // LZ4 by default
        }
    }

    /// Validates the header.
    pub fn validate(&self) -> ChunkResult<()> {
        if self.magic != MagicBytes::CHUNK.0 {
            return Err(ChunkError::InvalidFormat);
        }
        if !SchemaVersion::CHUNK_FORMAT.can_read(&self.version) {
            return Err(ChunkError::VersionMismatch {
                expected: SchemaVersion::CHUNK_FORMAT.to_string(),
                actual: self.version.to_string(),
            });
        }
        if self.size != CHUNK_SIZE {
            return Err(ChunkError::DeserializationFailed(format!(
                "unsupported chunk size {}",
                self.size
            )));
        }
        Ok(())
    }
}

/// A fixed-size grid of tiles plus lifecycle flags.
///
/// The store is the exclusive owner of every resident chunk; callers get
/// transient borrows and copy tiles out rather than holding references into
/// the grid.
#[derive(Debug)]
pub struct Chunk {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Tile data, row-major, `CHUNK_SIZE` x `CHUNK_SIZE`
    tiles: Box<[Tile; CHUNK_AREA]>,
    /// Modified since last successful save
    dirty: bool,
    /// Mesh/render data is stale
    needs_rebuild: bool,
    /// Populated and resident in a store
    loaded: bool,
}

impl Chunk {
    /// Creates a new chunk filled with air.
    #[must_use]
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            tiles: Box::new([Tile::AIR; CHUNK_AREA]),
            dirty: false,
            needs_rebuild: false,
            loaded: false,
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns whether the chunk has unsaved modifications.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether render data needs rebuilding.
    #[must_use]
    pub const fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    /// Returns whether the chunk has been populated and made resident.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Clears the dirty flag after a successful persistence write.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Clears the rebuild flag after the renderer has caught up.
    pub fn mark_rebuilt(&mut self) {
        self.needs_rebuild = false;
    }

    /// Marks the chunk as populated and resident.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
        self.needs_rebuild = true;
    }

    /// Gets the tile at a local coordinate (copy-out).
    ///
    /// # Panics
    ///
    /// Panics if `local` is outside the chunk grid. The coordinate mapping
    /// guarantees valid locals, so an out-of-bounds access is a programmer
    /// error; it is never clamped.
    #[must_use]
    pub fn get(&self, local: LocalCoord) -> Tile {
        assert!(
            local.in_bounds(CHUNK_SIZE),
            "local coordinate ({}, {}) outside {CHUNK_SIZE}x{CHUNK_SIZE} chunk grid",
            local.x,
            local.y
        );
        self.tiles[local.to_index(CHUNK_SIZE)]
    }

    /// Sets the tile at a local coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `local` is outside the chunk grid.
    pub fn set(&mut self, local: LocalCoord, tile: Tile) {
        assert!(
            local.in_bounds(CHUNK_SIZE),
            "local coordinate ({}, {}) outside {CHUNK_SIZE}x{CHUNK_SIZE} chunk grid",
            local.x,
            local.y
        );
        self.tiles[local.to_index(CHUNK_SIZE)] = tile;
        self.dirty = true;
        self.needs_rebuild = true;
    }

    /// Replaces the tile at a local coordinate with a fresh tile of `kind`.
    pub fn set_kind(&mut self, local: LocalCoord, kind: TileKind) {
        self.set(local, Tile::new(kind));
    }

    /// Clears the tile at a local coordinate to air.
    pub fn clear(&mut self, local: LocalCoord) {
        self.set(local, Tile::AIR);
    }

    /// Fills the whole grid with tiles of `kind`.
    pub fn fill(&mut self, kind: TileKind) {
        self.tiles.fill(Tile::new(kind));
        self.dirty = true;
        self.needs_rebuild = true;
    }

    /// Clears the whole grid to air.
    pub fn clear_all(&mut self) {
        self.fill(TileKind::Air);
    }

    /// Returns the tile grid as a slice.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles[..]
    }

    /// Returns the tile grid as a mutable slice, marking the chunk dirty.
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        self.dirty = true;
        self.needs_rebuild = true;
        &mut self.tiles[..]
    }

    /// Serializes the chunk to bytes: length-prefixed header, then the
    /// LZ4-compressed tile grid.
    pub fn to_bytes(&self) -> ChunkResult<Vec<u8>> {
        let header = ChunkHeader::new(self.coord);

        let header_bytes = bincode::serialize(&header)
            .map_err(|e| ChunkError::SerializationFailed(e.to_string()))?;

        let tile_bytes: &[u8] = bytemuck::cast_slice(&self.tiles[..]);
        let compressed = lz4_flex::compress_prepend_size(tile_bytes);

        let mut result = Vec::with_capacity(4 + header_bytes.len() + compressed.len());
        result.extend_from_slice(&(header_bytes.len() as u32).to_le_bytes());
        result.extend_from_slice(&header_bytes);
        result.extend_from_slice(&compressed);

        Ok(result)
    }

    /// Deserializes a chunk from bytes.
    ///
    /// Validates the header and every stored tile kind; the resulting chunk
    /// is clean and not yet marked loaded.
    pub fn from_bytes(bytes: &[u8]) -> ChunkResult<Self> {
        if bytes.len() < 8 {
            return Err(ChunkError::DeserializationFailed("data too short".into()));
        }

        let header_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if bytes.len() < 4 + header_len {
            return Err(ChunkError::DeserializationFailed(
                "header length mismatch".into(),
            ));
        }

        let header: ChunkHeader = bincode::deserialize(&bytes[4..4 + header_len])
            .map_err(|e| ChunkError::DeserializationFailed(e.to_string()))?;
        header.validate()?;

        let compressed = &bytes[4 + header_len..];
        let tile_bytes = lz4_flex::decompress_size_prepended(compressed)
            .map_err(|e| ChunkError::CompressionFailed(e.to_string()))?;

        let tile_size = std::mem::size_of::<Tile>();
        if tile_bytes.len() != CHUNK_AREA * tile_size {
            return Err(ChunkError::DeserializationFailed(
                "tile data size mismatch".into(),
            ));
        }

        let mut tiles = Box::new([Tile::AIR; CHUNK_AREA]);
        for (slot, raw) in tiles.iter_mut().zip(tile_bytes.chunks_exact(tile_size)) {
            let tile: Tile = bytemuck::pod_read_unaligned(raw);
            if TileKind::from_id(tile.kind).is_none() {
                return Err(ChunkError::UnknownTileKind(tile.kind));
            }
            *slot = tile;
        }

        Ok(Self {
            coord: ChunkCoord::new(header.x, header.y),
            tiles,
            dirty: false,
            needs_rebuild: false,
            loaded: false,
        })
    }
}
