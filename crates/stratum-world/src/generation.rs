//! Procedural terrain generation.

use noise::{NoiseFn, Perlin};
use stratum_common::ChunkCoord;

use crate::chunk::{Chunk, CHUNK_SIZE};
use crate::tile::{Tile, TileKind};

/// Produces terrain for chunks that have no persisted state.
///
/// Implementations must be total and deterministic: the same
/// `(chunk.coord(), seed)` pair always yields identical terrain, every cell
/// is populated, and the chunk is left clean (generated state is
/// reproducible, so it is not considered modified).
pub trait TerrainGenerator {
    /// Populates `chunk` in place.
    fn generate(&self, chunk: &mut Chunk, seed: u64);
}

/// World generator configuration.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Tile row of the mean surface line
    pub surface_level: i64,
    /// Maximum surface deviation from the mean, in tiles
    pub surface_amplitude: f64,
    /// Terrain scale (larger = smoother)
    pub terrain_scale: f64,
    /// Tile rows of dirt between surface and stone
    pub dirt_depth: i64,
    /// Tile row where standing water collects in basins
    pub water_level: i64,
    /// Tile row at and below which everything is bedrock
    pub bedrock_level: i64,
    /// Ore vein placement attempts per chunk
    pub ore_attempts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            surface_level: 0,
            surface_amplitude: 12.0,
            terrain_scale: 80.0,
            dirt_depth: 6,
            water_level: 8,
            bedrock_level: 480,
            ore_attempts: 24,
        }
    }
}

/// Perlin-based side-view terrain generator.
///
/// Y grows downward: rows above the surface line are air (or water in
/// basins), followed by a grass-capped dirt mantle, a stone body with
/// scattered ore veins, and a bedrock floor.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    /// Configuration
    config: GeneratorConfig,
}

impl NoiseGenerator {
    /// Creates a new generator with the given config.
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Returns the generator configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Surface row for a world tile column.
    fn surface_height(&self, noise: &Perlin, world_x: i64) -> i64 {
        let sample = noise.get([world_x as f64 / self.config.terrain_scale, 0.0]);
        self.config.surface_level + (sample * self.config.surface_amplitude).round() as i64
    }

    /// Mixes the chunk coordinate into the world seed for per-chunk scatter.
    fn chunk_seed(seed: u64, coord: ChunkCoord) -> u64 {
        let x = coord.x as i64 as u64;
        let y = coord.y as i64 as u64;
        seed ^ x.wrapping_mul(0x9E37_79B9_7F4A_7C15)
            ^ y.wrapping_mul(0xC2B2_AE3D_27D4_EB4F)
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl TerrainGenerator for NoiseGenerator {
    fn generate(&self, chunk: &mut Chunk, seed: u64) {
        let height_noise = Perlin::new(seed as u32);
        let coord = chunk.coord();
        let base = coord.base_tile(CHUNK_SIZE);
        let size = CHUNK_SIZE as usize;

        let tiles = chunk.tiles_mut();
        for lx in 0..size {
            let world_x = base.x + lx as i64;
            let surface = self.surface_height(&height_noise, world_x);
            // Basins below the water line flood and take a sand surface.
            let flooded = surface > self.config.water_level;

            for ly in 0..size {
                let world_y = base.y + ly as i64;
                let kind = if world_y >= self.config.bedrock_level {
                    TileKind::Bedrock
                } else if world_y < surface {
                    if flooded && world_y >= self.config.water_level {
                        TileKind::Water
                    } else {
                        TileKind::Air
                    }
                } else if world_y == surface {
                    if flooded {
                        TileKind::Sand
                    } else {
                        TileKind::Grass
                    }
                } else if world_y <= surface + self.config.dirt_depth {
                    TileKind::Dirt
                } else {
                    TileKind::Stone
                };
                tiles[ly * size + lx] = Tile::new(kind);
            }
        }

        // Ore veins: deterministic per-chunk scatter in the stone body.
        let mut rng = fastrand::Rng::with_seed(Self::chunk_seed(seed, coord));
        let shallow_ore_limit = self.config.surface_level + 96;
        for _ in 0..self.config.ore_attempts {
            let lx = rng.usize(..size);
            let ly = rng.usize(..size);
            let index = ly * size + lx;
            if tiles[index].kind() != TileKind::Stone {
                continue;
            }
            let world_y = base.y + ly as i64;
            let ore = if world_y < shallow_ore_limit {
                TileKind::CopperOre
            } else {
                TileKind::IronOre
            };
            tiles[index] = Tile::new(ore);
        }

        // Generated terrain is reproducible; it starts clean.
        chunk.mark_saved();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_deterministic() {
        let generator = NoiseGenerator::default();
        let mut a = Chunk::new(ChunkCoord::new(2, -1));
        let mut b = Chunk::new(ChunkCoord::new(2, -1));

        generator.generate(&mut a, 42);
        generator.generate(&mut b, 42);

        assert_eq!(a.tiles(), b.tiles());
    }

    #[test]
    fn test_different_seeds_different_terrain() {
        let generator = NoiseGenerator::default();
        let mut a = Chunk::new(ChunkCoord::new(0, 0));
        let mut b = Chunk::new(ChunkCoord::new(0, 0));

        generator.generate(&mut a, 42);
        generator.generate(&mut b, 999);

        assert_ne!(a.tiles(), b.tiles());
    }

    #[test]
    fn test_generated_chunk_is_clean() {
        let generator = NoiseGenerator::default();
        let mut chunk = Chunk::new(ChunkCoord::new(0, 0));
        generator.generate(&mut chunk, 7);
        assert!(!chunk.is_dirty());
    }

    #[test]
    fn test_sky_and_underground_bands() {
        let generator = NoiseGenerator::default();
        // Default surface stays within +-12 of row 0, so chunk row -2
        // (rows -64..-33) is open sky and chunk row 2 (rows 64..95) is
        // fully below the dirt mantle.
        let mut sky = Chunk::new(ChunkCoord::new(0, -2));
        let mut underground = Chunk::new(ChunkCoord::new(0, 2));
        generator.generate(&mut sky, 7);
        generator.generate(&mut underground, 7);

        assert!(sky.tiles().iter().all(|t| t.is_empty()));
        assert!(underground.tiles().iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_deep_chunk_is_bedrock() {
        let generator = NoiseGenerator::default();
        // Default bedrock level 480 = chunk row 15.
        let mut chunk = Chunk::new(ChunkCoord::new(0, 16));
        generator.generate(&mut chunk, 7);
        assert!(chunk
            .tiles()
            .iter()
            .all(|t| t.kind() == TileKind::Bedrock));
    }
}
