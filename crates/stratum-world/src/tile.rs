//! Tile data structures.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// A single grid cell.
///
/// Tiles are plain 4-byte values, copied freely. Layout:
/// - `kind`: terrain type ID (see [`TileKind`])
/// - `flags`: state bitset (see [`TileFlags`])
/// - `damage`: accumulated mining damage (0 = intact)
///
/// Invariant: [`TileFlags::ACTIVE`] is set if and only if the kind is not
/// air. Construct tiles through [`Tile::new`] / [`Tile::AIR`] to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct Tile {
    /// Terrain type ID (0 = air)
    pub kind: u16,
    /// Tile flags (see [`TileFlags`])
    pub flags: u8,
    /// Mining damage (0-255)
    pub damage: u8,
}

impl Default for Tile {
    fn default() -> Self {
        Self::AIR
    }
}

impl Tile {
    /// The empty/air tile sentinel.
    pub const AIR: Self = Self {
        kind: TileKind::Air as u16,
        flags: 0,
        damage: 0,
    };

    /// Creates a tile of the given kind with the active flag set correctly.
    #[must_use]
    pub const fn new(kind: TileKind) -> Self {
        let flags = if matches!(kind, TileKind::Air) {
            0
        } else {
            TileFlags::ACTIVE
        };
        Self {
            kind: kind as u16,
            flags,
            damage: 0,
        }
    }

    /// Returns the tile's kind.
    ///
    /// Raw kind IDs are validated at the codec boundary, so an in-memory
    /// tile always maps back to a known kind; unknown IDs read as air.
    #[must_use]
    pub const fn kind(self) -> TileKind {
        match TileKind::from_id(self.kind) {
            Some(kind) => kind,
            None => TileKind::Air,
        }
    }

    /// Checks if this tile is empty (air).
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.kind == TileKind::Air as u16
    }

    /// Checks if the active (solid presence) flag is set.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.flags & TileFlags::ACTIVE != 0
    }

    /// Returns the tile with a flag set.
    #[must_use]
    pub const fn with_flag(mut self, flag: u8) -> Self {
        self.flags |= flag;
        self
    }

    /// Returns the tile with mining damage set.
    #[must_use]
    pub const fn with_damage(mut self, damage: u8) -> Self {
        self.damage = damage;
        self
    }
}

/// Tile flag bits.
pub struct TileFlags;

impl TileFlags {
    /// Tile holds terrain (set iff kind != air) - bit 0
    pub const ACTIVE: u8 = 1 << 0;
    /// Tile sits in the background layer - bit 1
    pub const BACKGROUND: u8 = 1 << 1;
    /// Tile has taken mining damage - bit 2
    pub const DAMAGED: u8 = 1 << 2;
}

/// Terrain type identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum TileKind {
    /// Empty space
    Air = 0,
    /// Plain soil
    Dirt = 1,
    /// Grass-capped soil surface
    Grass = 2,
    /// Base rock
    Stone = 3,
    /// Loose sand
    Sand = 4,
    /// Standing water
    Water = 5,
    /// Copper ore vein
    CopperOre = 6,
    /// Iron ore vein
    IronOre = 7,
    /// Indestructible world floor
    Bedrock = 8,
}

impl TileKind {
    /// Number of defined tile kinds.
    pub const COUNT: usize = 9;

    /// Looks up a kind by its raw ID.
    #[must_use]
    pub const fn from_id(id: u16) -> Option<Self> {
        match id {
            0 => Some(Self::Air),
            1 => Some(Self::Dirt),
            2 => Some(Self::Grass),
            3 => Some(Self::Stone),
            4 => Some(Self::Sand),
            5 => Some(Self::Water),
            6 => Some(Self::CopperOre),
            7 => Some(Self::IronOre),
            8 => Some(Self::Bedrock),
            _ => None,
        }
    }

    /// Returns the raw kind ID.
    #[must_use]
    pub const fn id(self) -> u16 {
        self as u16
    }
}
