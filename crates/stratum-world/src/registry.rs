//! Static tile property lookup.
//!
//! One immutable table built at startup and shared by reference into the
//! systems that need it. The store itself never caches answers from it.

use crate::tile::TileKind;

/// Physical and gameplay properties of one tile kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileProperties {
    /// Blocks movement
    pub is_solid: bool,
    /// Stops light propagation
    pub blocks_light: bool,
    /// Ticks of mining to break (0 = unbreakable or instant for air)
    pub mining_time_ticks: u16,
    /// Minimum pickaxe tier required to mine (0 = any)
    pub pickaxe_tier: u8,
    /// Emitted light level (0 = none)
    pub light_emission: u8,
    /// Falls when unsupported
    pub affected_by_gravity: bool,
    /// Merges visually with neighbors of the same kind
    pub can_merge: bool,
}

impl TileProperties {
    const AIR: Self = Self {
        is_solid: false,
        blocks_light: false,
        mining_time_ticks: 0,
        pickaxe_tier: 0,
        light_emission: 0,
        affected_by_gravity: false,
        can_merge: false,
    };
}

/// Immutable per-kind property table.
///
/// Constructed once (typically [`TileRegistry::standard`]) and handed out
/// behind an `Arc`; there is no global instance.
#[derive(Debug, Clone)]
pub struct TileRegistry {
    entries: [TileProperties; TileKind::COUNT],
}

impl TileRegistry {
    /// Builds the standard terrain property table.
    #[must_use]
    pub fn standard() -> Self {
        let mut entries = [TileProperties::AIR; TileKind::COUNT];
        entries[TileKind::Dirt.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 20,
            pickaxe_tier: 0,
            light_emission: 0,
            affected_by_gravity: false,
            can_merge: true,
        };
        entries[TileKind::Grass.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 20,
            pickaxe_tier: 0,
            light_emission: 0,
            affected_by_gravity: false,
            can_merge: true,
        };
        entries[TileKind::Stone.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 60,
            pickaxe_tier: 1,
            light_emission: 0,
            affected_by_gravity: false,
            can_merge: true,
        };
        entries[TileKind::Sand.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 15,
            pickaxe_tier: 0,
            light_emission: 0,
            affected_by_gravity: true,
            can_merge: true,
        };
        entries[TileKind::Water.id() as usize] = TileProperties {
            is_solid: false,
            blocks_light: false,
            mining_time_ticks: 0,
            pickaxe_tier: 0,
            light_emission: 0,
            affected_by_gravity: true,
            can_merge: true,
        };
        entries[TileKind::CopperOre.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 80,
            pickaxe_tier: 1,
            light_emission: 1,
            affected_by_gravity: false,
            can_merge: true,
        };
        entries[TileKind::IronOre.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 120,
            pickaxe_tier: 2,
            light_emission: 0,
            affected_by_gravity: false,
            can_merge: true,
        };
        entries[TileKind::Bedrock.id() as usize] = TileProperties {
            is_solid: true,
            blocks_light: true,
            mining_time_ticks: 0,
            pickaxe_tier: u8::MAX,
            light_emission: 0,
            affected_by_gravity: false,
            can_merge: false,
        };
        Self { entries }
    }

    /// Returns the properties for a tile kind.
    #[must_use]
    pub const fn get(&self, kind: TileKind) -> TileProperties {
        self.entries[kind.id() as usize]
    }
}
