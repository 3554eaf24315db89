//! Chunk persistence: write-back storage keyed by chunk coordinate.

use std::path::{Path, PathBuf};

use stratum_common::ChunkCoord;
use thiserror::Error;
use tracing::debug;

use crate::chunk::{Chunk, ChunkError};

/// Persistence errors.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored data could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] ChunkError),
    /// Stored chunk does not match the requested coordinate
    #[error("Coordinate mismatch: requested ({0}, {1}), file holds ({2}, {3})")]
    CoordMismatch(i32, i32, i32, i32),
}

/// Result type for persistence operations.
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Stores and retrieves chunks by coordinate.
///
/// The encoding is opaque to the store; the only contract is that `save`
/// followed by `load` round-trips the full tile grid, and that the bytes
/// captured by `save` reflect the chunk as it existed at call time.
pub trait ChunkPersistence {
    /// Loads the chunk at `coord`, or `None` if nothing is stored there.
    fn load(&mut self, coord: ChunkCoord) -> PersistenceResult<Option<Chunk>>;

    /// Writes `chunk` out, replacing any previous state at its coordinate.
    fn save(&mut self, chunk: &Chunk) -> PersistenceResult<()>;
}

/// One-file-per-chunk disk persistence.
#[derive(Debug)]
pub struct DiskPersistence {
    /// World save directory
    save_dir: PathBuf,
}

impl DiskPersistence {
    /// Creates disk persistence rooted at `save_dir`.
    #[must_use]
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
        }
    }

    /// Returns the save directory.
    #[must_use]
    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Returns the file path for a chunk.
    fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        self.save_dir
            .join(format!("chunk_{}_{}.stch", coord.x, coord.y))
    }
}

impl ChunkPersistence for DiskPersistence {
    fn load(&mut self, coord: ChunkCoord) -> PersistenceResult<Option<Chunk>> {
        let path = self.chunk_path(coord);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let chunk = Chunk::from_bytes(&bytes)?;
        if chunk.coord() != coord {
            return Err(PersistenceError::CoordMismatch(
                coord.x,
                coord.y,
                chunk.coord().x,
                chunk.coord().y,
            ));
        }

        debug!(x = coord.x, y = coord.y, "loaded chunk from disk");
        Ok(Some(chunk))
    }

    fn save(&mut self, chunk: &Chunk) -> PersistenceResult<()> {
        std::fs::create_dir_all(&self.save_dir)?;
        let bytes = chunk.to_bytes()?;
        std::fs::write(self.chunk_path(chunk.coord()), bytes)?;
        debug!(
            x = chunk.coord().x,
            y = chunk.coord().y,
            "saved chunk to disk"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;
    use stratum_common::LocalCoord;

    #[test]
    fn test_disk_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut persistence = DiskPersistence::new(dir.path());

        let coord = ChunkCoord::new(-4, 9);
        let mut chunk = Chunk::new(coord);
        chunk.set_kind(LocalCoord::new(1, 2), TileKind::CopperOre);
        persistence.save(&chunk).expect("save failed");

        let loaded = persistence
            .load(coord)
            .expect("load failed")
            .expect("chunk missing");
        assert_eq!(loaded.tiles(), chunk.tiles());
    }

    #[test]
    fn test_missing_chunk_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut persistence = DiskPersistence::new(dir.path());
        let result = persistence.load(ChunkCoord::new(100, 100)).expect("load");
        assert!(result.is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut persistence = DiskPersistence::new(dir.path());
        std::fs::write(dir.path().join("chunk_0_0.stch"), b"not a chunk").expect("write");
        assert!(persistence.load(ChunkCoord::new(0, 0)).is_err());
    }
}
