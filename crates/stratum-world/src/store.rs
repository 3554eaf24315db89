//! The streaming chunk store: residency, on-demand creation, eviction.

use ahash::AHashMap;
use stratum_common::{ChunkCoord, WorldCoord, WorldRect};
use tracing::{debug, info, warn};

use crate::chunk::{Chunk, CHUNK_SIZE, TILE_SIZE};
use crate::generation::TerrainGenerator;
use crate::persistence::ChunkPersistence;

/// Chunk store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Chebyshev radius (in chunks) kept loaded around the reference point
    pub load_radius: u32,
    /// Extra Chebyshev distance a chunk may drift before eviction
    pub unload_buffer: u32,
    /// World seed for procedural generation
    pub seed: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            load_radius: 3,
            unload_buffer: 2,
            seed: 12345,
        }
    }
}

/// Residency changes produced by one [`ChunkStore::update_residency`] call.
///
/// Returned as a plain value so subscribers are visible in control flow
/// rather than hidden behind callbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidencyChange {
    /// Chunks that became resident during this update
    pub loaded: Vec<ChunkCoord>,
    /// Chunks evicted during this update
    pub evicted: Vec<ChunkCoord>,
}

impl ResidencyChange {
    /// Whether the update changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.evicted.is_empty()
    }
}

/// Owns all resident chunks and manages their lifecycle.
///
/// Chunks are produced on demand (persisted state first, generation as
/// fallback) and evicted with dirty write-back once they fall out of range
/// of the reference point. Single-threaded by design: generation and
/// persistence run synchronously on the caller's thread, and chunk borrows
/// are transient.
pub struct ChunkStore {
    /// Configuration
    config: StoreConfig,
    /// Resident chunks; this map's keys define "currently loaded"
    chunks: AHashMap<ChunkCoord, Chunk>,
    /// Terrain source for chunks with no persisted state
    generator: Box<dyn TerrainGenerator>,
    /// Optional write-back storage
    persistence: Option<Box<dyn ChunkPersistence>>,
    /// Reference chunk from the last residency update
    center: Option<ChunkCoord>,
}

impl ChunkStore {
    /// Creates a store with no persistence (generation only).
    #[must_use]
    pub fn new(config: StoreConfig, generator: Box<dyn TerrainGenerator>) -> Self {
        Self {
            config,
            chunks: AHashMap::new(),
            generator,
            persistence: None,
            center: None,
        }
    }

    /// Attaches a persistence collaborator for load and write-back.
    #[must_use]
    pub fn with_persistence(mut self, persistence: Box<dyn ChunkPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Looks up a resident chunk. Never loads.
    #[must_use]
    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Mutably looks up a resident chunk. Never loads.
    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        self.chunks.get_mut(&coord)
    }

    /// Checks if a chunk is resident.
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Returns the number of resident chunks.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates over all resident chunks.
    pub fn loaded_chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Iterates over resident chunks whose area intersects `rect`.
    pub fn chunks_in_bounds(&self, rect: WorldRect) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks
            .values()
            .filter(move |chunk| rect.contains_chunk(chunk.coord(), CHUNK_SIZE, TILE_SIZE))
    }

    /// Returns the chunk at `coord`, producing it if not resident.
    ///
    /// Production order: persisted state if the persistence collaborator has
    /// it, otherwise procedural generation. A persistence read failure is
    /// downgraded to "no saved chunk" so gameplay never blocks on storage.
    pub fn get_or_create(&mut self, coord: ChunkCoord) -> &mut Chunk {
        if !self.chunks.contains_key(&coord) {
            let chunk = self.produce(coord);
            self.chunks.insert(coord, chunk);
            debug!("chunk ({}, {}) became resident", coord.x, coord.y);
        }
        match self.chunks.get_mut(&coord) {
            Some(chunk) => chunk,
            None => unreachable!("chunk inserted above"),
        }
    }

    /// Updates residency around a reference world position.
    ///
    /// No-op when the reference has not crossed a chunk boundary since the
    /// last call and chunks are resident. Otherwise every chunk within the
    /// load radius of the new center is made resident, and only after all
    /// loads complete, every resident chunk beyond `load_radius +
    /// unload_buffer` is evicted (with write-back if dirty). The
    /// load-before-evict ordering means a chunk in both the old and new
    /// load sets is never transiently dropped; the unload buffer keeps a
    /// reference point oscillating at the load boundary from thrashing.
    pub fn update_residency(&mut self, reference: WorldCoord) -> ResidencyChange {
        let new_center = reference.to_chunk(CHUNK_SIZE, TILE_SIZE);
        if self.center == Some(new_center) && !self.chunks.is_empty() {
            return ResidencyChange::default();
        }
        self.center = Some(new_center);

        let mut change = ResidencyChange::default();

        let radius = self.config.load_radius as i32;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = ChunkCoord::new(new_center.x + dx, new_center.y + dy);
                if !self.chunks.contains_key(&coord) {
                    let chunk = self.produce(coord);
                    self.chunks.insert(coord, chunk);
                    change.loaded.push(coord);
                }
            }
        }

        let evict_beyond = self.config.load_radius + self.config.unload_buffer;
        let out_of_range: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|coord| coord.chebyshev_distance(new_center) > evict_beyond)
            .copied()
            .collect();
        for coord in out_of_range {
            self.evict(coord);
            change.evicted.push(coord);
        }

        if !change.is_empty() {
            info!(
                "residency update at ({}, {}): {} loaded, {} evicted, {} resident",
                new_center.x,
                new_center.y,
                change.loaded.len(),
                change.evicted.len(),
                self.chunks.len()
            );
        }
        change
    }

    /// Writes back every dirty resident chunk. Returns the number saved.
    ///
    /// Chunks that fail to save stay dirty; without a persistence
    /// collaborator this is a no-op.
    pub fn save_all(&mut self) -> usize {
        let Some(persistence) = self.persistence.as_mut() else {
            return 0;
        };
        let mut saved = 0;
        for chunk in self.chunks.values_mut() {
            if !chunk.is_dirty() {
                continue;
            }
            match persistence.save(chunk) {
                Ok(()) => {
                    chunk.mark_saved();
                    saved += 1;
                },
                Err(e) => {
                    warn!(
                        "failed to save chunk ({}, {}): {e}",
                        chunk.coord().x,
                        chunk.coord().y
                    );
                },
            }
        }
        info!("saved {saved} chunks");
        saved
    }

    /// Produces a chunk for `coord`: persisted state, else generation.
    fn produce(&mut self, coord: ChunkCoord) -> Chunk {
        if let Some(persistence) = self.persistence.as_mut() {
            match persistence.load(coord) {
                Ok(Some(mut chunk)) => {
                    chunk.mark_loaded();
                    return chunk;
                },
                Ok(None) => {},
                Err(e) => {
                    // Treat unreadable state as absent: the chunk is
                    // regenerated and prior modifications there are lost.
                    warn!(
                        "failed to load chunk ({}, {}), regenerating: {e}",
                        coord.x, coord.y
                    );
                },
            }
        }

        let mut chunk = Chunk::new(coord);
        self.generator.generate(&mut chunk, self.config.seed);
        chunk.mark_loaded();
        chunk
    }

    /// Removes a chunk from residency, saving it first if dirty.
    ///
    /// A write-back failure does not block eviction: bounded memory wins
    /// over durability for that chunk.
    fn evict(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.remove(&coord) else {
            return;
        };
        if chunk.is_dirty() {
            if let Some(persistence) = self.persistence.as_mut() {
                if let Err(e) = persistence.save(&chunk) {
                    warn!(
                        "failed to save chunk ({}, {}) during eviction: {e}",
                        coord.x, coord.y
                    );
                }
            }
        }
        debug!("chunk ({}, {}) evicted", coord.x, coord.y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::NoiseGenerator;
    use crate::tile::TileKind;
    use stratum_common::LocalCoord;

    fn store_with_radius(load_radius: u32, unload_buffer: u32) -> ChunkStore {
        ChunkStore::new(
            StoreConfig {
                load_radius,
                unload_buffer,
                seed: 42,
            },
            Box::new(NoiseGenerator::default()),
        )
    }

    /// World position at the center of a chunk.
    fn chunk_world_pos(coord: ChunkCoord) -> WorldCoord {
        let span = (CHUNK_SIZE * TILE_SIZE) as i64;
        WorldCoord::new(coord.x as i64 * span + span / 2, coord.y as i64 * span + span / 2)
    }

    #[test]
    fn test_get_does_not_load() {
        let store = store_with_radius(1, 1);
        assert!(store.get(ChunkCoord::new(0, 0)).is_none());
        assert_eq!(store.loaded_count(), 0);
    }

    #[test]
    fn test_get_or_create_generates() {
        let mut store = store_with_radius(1, 1);
        let chunk = store.get_or_create(ChunkCoord::new(3, 3));
        assert!(chunk.is_loaded());
        assert_eq!(store.loaded_count(), 1);
    }

    #[test]
    fn test_first_update_fills_load_square() {
        let mut store = store_with_radius(2, 1);
        let change = store.update_residency(chunk_world_pos(ChunkCoord::new(0, 0)));
        // (2*2+1)^2 chunks around the center.
        assert_eq!(change.loaded.len(), 25);
        assert!(change.evicted.is_empty());
        assert_eq!(store.loaded_count(), 25);
    }

    #[test]
    fn test_repeat_update_is_noop() {
        let mut store = store_with_radius(2, 1);
        let pos = chunk_world_pos(ChunkCoord::new(0, 0));
        let first = store.update_residency(pos);
        assert!(!first.is_empty());

        let second = store.update_residency(pos);
        assert!(second.is_empty());
    }

    #[test]
    fn test_same_center_empty_map_reloads() {
        let mut store = store_with_radius(1, 1);
        let pos = chunk_world_pos(ChunkCoord::new(0, 0));
        store.update_residency(pos);

        // Simulate external teardown; the fast path must not mask it.
        store.chunks.clear();
        let change = store.update_residency(pos);
        assert_eq!(change.loaded.len(), 9);
    }

    #[test]
    fn test_chunks_in_bounds() {
        let mut store = store_with_radius(1, 1);
        store.update_residency(chunk_world_pos(ChunkCoord::new(0, 0)));

        let span = (CHUNK_SIZE * TILE_SIZE) as i64;
        let rect = WorldRect::new(WorldCoord::new(0, 0), WorldCoord::new(span - 1, span - 1));
        let hits: Vec<ChunkCoord> = store.chunks_in_bounds(rect).map(Chunk::coord).collect();
        assert_eq!(hits, vec![ChunkCoord::new(0, 0)]);
    }

    #[test]
    fn test_mutation_survives_roundtrip_through_residency() {
        let mut store = store_with_radius(1, 4);
        store.update_residency(chunk_world_pos(ChunkCoord::new(0, 0)));

        let coord = ChunkCoord::new(0, 0);
        store
            .get_mut(coord)
            .expect("resident")
            .set_kind(LocalCoord::new(5, 5), TileKind::Sand);

        // Move within the unload buffer: chunk stays, mutation intact.
        store.update_residency(chunk_world_pos(ChunkCoord::new(2, 0)));
        let tile = store.get(coord).expect("still resident").get(LocalCoord::new(5, 5));
        assert_eq!(tile.kind(), TileKind::Sand);
    }
}
