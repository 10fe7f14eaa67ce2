//! Sparse tile → terrain index.

use ahash::AHashMap;
use meadow_common::TileCoord;

use crate::terrain::TerrainType;

/// Sparse mapping from tile coordinate to terrain type.
///
/// Keyed by packed 64-bit tile keys since the tile plane is unbounded in
/// every direction. Entries are added when a chunk becomes resident and
/// removed when it is evicted; they are never edited in place except when a
/// resident chunk is regenerated.
#[derive(Debug, Default, Clone)]
pub struct MapData {
    tiles: AHashMap<u64, TerrainType>,
}

impl MapData {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the terrain of a tile, returning the previous value.
    pub fn insert(&mut self, tile: TileCoord, terrain: TerrainType) -> Option<TerrainType> {
        self.tiles.insert(tile.packed(), terrain)
    }

    /// Terrain at a tile, or `None` if the tile is not indexed.
    #[must_use]
    pub fn get(&self, tile: TileCoord) -> Option<TerrainType> {
        self.tiles.get(&tile.packed()).copied()
    }

    /// Removes a tile, returning its terrain.
    pub fn remove(&mut self, tile: TileCoord) -> Option<TerrainType> {
        self.tiles.remove(&tile.packed())
    }

    /// Checks whether a tile is indexed.
    #[must_use]
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.tiles.contains_key(&tile.packed())
    }

    /// Number of indexed tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if no tiles are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// Iterates all indexed tiles in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TerrainType)> + '_ {
        self.tiles
            .iter()
            .map(|(&key, &terrain)| (TileCoord::from_packed(key), terrain))
    }
}
