//! World-coordinate tile access over the chunk store.

use std::sync::Arc;

use stratum_common::{TileCoord, WorldCoord, WorldRect};

use crate::chunk::{Chunk, CHUNK_SIZE};
use crate::registry::TileRegistry;
use crate::store::{ChunkStore, ResidencyChange};
use crate::tile::{Tile, TileKind};

/// Tile-level facade over a [`ChunkStore`].
///
/// Resolves world tile coordinates to (chunk, local) pairs and dispatches
/// to the owning chunk. Reads never force residency; writes do.
pub struct TileMap {
    /// The underlying chunk store
    store: ChunkStore,
    /// Static tile property table, consulted per query, never cached
    registry: Arc<TileRegistry>,
}

impl TileMap {
    /// Creates a tile map over `store` using `registry` for tile properties.
    #[must_use]
    pub fn new(store: ChunkStore, registry: Arc<TileRegistry>) -> Self {
        Self { store, registry }
    }

    /// Returns the tile at a world tile coordinate.
    ///
    /// Reading an unloaded region does not force residency; it returns the
    /// air sentinel instead.
    #[must_use]
    pub fn tile_at(&self, coord: TileCoord) -> Tile {
        match self.store.get(coord.to_chunk(CHUNK_SIZE)) {
            Some(chunk) => chunk.get(coord.to_local(CHUNK_SIZE)),
            None => Tile::AIR,
        }
    }

    /// Sets the tile at a world tile coordinate, forcing residency.
    pub fn set_tile_at(&mut self, coord: TileCoord, tile: Tile) {
        self.store
            .get_or_create(coord.to_chunk(CHUNK_SIZE))
            .set(coord.to_local(CHUNK_SIZE), tile);
    }

    /// Replaces the tile at a world tile coordinate with a fresh tile of
    /// `kind`, forcing residency.
    pub fn set_kind_at(&mut self, coord: TileCoord, kind: TileKind) {
        self.store
            .get_or_create(coord.to_chunk(CHUNK_SIZE))
            .set_kind(coord.to_local(CHUNK_SIZE), kind);
    }

    /// Clears the tile at a world tile coordinate to air, forcing residency.
    pub fn clear_tile_at(&mut self, coord: TileCoord) {
        self.store
            .get_or_create(coord.to_chunk(CHUNK_SIZE))
            .clear(coord.to_local(CHUNK_SIZE));
    }

    /// Whether the tile at a world tile coordinate blocks movement.
    #[must_use]
    pub fn is_solid_at(&self, coord: TileCoord) -> bool {
        self.registry.get(self.tile_at(coord).kind()).is_solid
    }

    /// Updates chunk residency around a reference world position.
    pub fn update_residency(&mut self, reference: WorldCoord) -> ResidencyChange {
        self.store.update_residency(reference)
    }

    /// Iterates over all resident chunks.
    pub fn loaded_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.store.loaded_chunks()
    }

    /// Iterates over resident chunks intersecting `rect`.
    pub fn chunks_in_bounds(&self, rect: WorldRect) -> impl Iterator<Item = &Chunk> + '_ {
        self.store.chunks_in_bounds(rect)
    }

    /// Writes back every dirty resident chunk.
    pub fn save_all(&mut self) -> usize {
        self.store.save_all()
    }

    /// Returns the underlying chunk store.
    #[must_use]
    pub const fn store(&self) -> &ChunkStore {
        &self.store
    }

    /// Returns the underlying chunk store mutably.
    pub fn store_mut(&mut self) -> &mut ChunkStore {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{NoiseGenerator, TerrainGenerator};
    use crate::store::StoreConfig;
    use stratum_common::ChunkCoord;

    /// Generator used where test terrain must be fully predictable.
    struct FlatGenerator(TileKind);

    impl TerrainGenerator for FlatGenerator {
        fn generate(&self, chunk: &mut Chunk, _seed: u64) {
            chunk.fill(self.0);
            chunk.mark_saved();
        }
    }

    fn flat_map(kind: TileKind) -> TileMap {
        TileMap::new(
            ChunkStore::new(StoreConfig::default(), Box::new(FlatGenerator(kind))),
            Arc::new(TileRegistry::standard()),
        )
    }

    #[test]
    fn test_read_unloaded_returns_air() {
        let map = flat_map(TileKind::Stone);
        let tile = map.tile_at(TileCoord::new(1000, -1000));
        assert!(tile.is_empty());
        assert_eq!(map.store().loaded_count(), 0);
    }

    #[test]
    fn test_write_forces_residency_and_dirties() {
        let mut map = flat_map(TileKind::Air);
        let coord = TileCoord::new(-1, -1);
        map.set_kind_at(coord, TileKind::Dirt);

        assert_eq!(map.store().loaded_count(), 1);
        assert_eq!(map.tile_at(coord).kind(), TileKind::Dirt);

        let chunk = map.store().get(ChunkCoord::new(-1, -1)).expect("resident");
        assert!(chunk.is_dirty());
        assert!(chunk.needs_rebuild());
    }

    #[test]
    fn test_clear_tile() {
        let mut map = flat_map(TileKind::Stone);
        let coord = TileCoord::new(10, 10);
        assert!(!map.is_solid_at(coord)); // not resident yet

        map.clear_tile_at(coord);
        assert!(map.tile_at(coord).is_empty());
        // Rest of the chunk kept the generated stone.
        assert!(map.is_solid_at(TileCoord::new(11, 10)));
    }

    #[test]
    fn test_is_solid_consults_registry() {
        let mut map = flat_map(TileKind::Air);
        let coord = TileCoord::new(0, 0);
        map.set_kind_at(coord, TileKind::Water);
        assert!(!map.is_solid_at(coord));

        map.set_kind_at(coord, TileKind::Stone);
        assert!(map.is_solid_at(coord));
    }

    #[test]
    fn test_negative_coordinates_hit_correct_cell() {
        let mut map = TileMap::new(
            ChunkStore::new(StoreConfig::default(), Box::new(NoiseGenerator::default())),
            Arc::new(TileRegistry::standard()),
        );
        let coord = TileCoord::new(-1, -1);
        map.set_kind_at(coord, TileKind::Sand);

        // Tile (-1, -1) lives in chunk (-1, -1) at local (31, 31).
        let chunk = map.store().get(ChunkCoord::new(-1, -1)).expect("resident");
        assert_eq!(
            chunk.get(stratum_common::LocalCoord::new(31, 31)).kind(),
            TileKind::Sand
        );
        // The neighboring tile in chunk (0, 0) is untouched by this write.
        assert_eq!(map.store().loaded_count(), 1);
    }
}
