//! Generated chunk data.

use meadow_common::{ChunkCoord, TileCoord, TileRect};

use crate::terrain::{TerrainType, TileVariant};

/// Terrain and variants for exactly the tiles of one chunk.
///
/// Immutable once generated; regenerating the same coordinate with the same
/// seed and smoothing setting yields an equal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTerrain {
    /// Chunk coordinate
    coord: ChunkCoord,
    /// Chunk size (width and height in tiles)
    size: u32,
    /// Terrain per tile, row-major over the chunk's tile rectangle
    terrain: Vec<TerrainType>,
    /// Variant per tile, same layout as `terrain`
    variants: Vec<TileVariant>,
}

impl ChunkTerrain {
    /// Creates a chunk from row-major terrain and variant data.
    ///
    /// Both vectors must hold `size * size` entries.
    #[must_use]
    pub fn new(
        coord: ChunkCoord,
        size: u32,
        terrain: Vec<TerrainType>,
        variants: Vec<TileVariant>,
    ) -> Self {
        let tile_count = size as usize * size as usize;
        debug_assert_eq!(terrain.len(), tile_count);
        debug_assert_eq!(variants.len(), tile_count);
        Self {
            coord,
            size,
            terrain,
            variants,
        }
    }

    /// Returns the chunk coordinate.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the tiles owned by this chunk.
    #[must_use]
    pub const fn rect(&self) -> TileRect {
        self.coord.tile_rect(self.size)
    }

    /// Number of tiles in the chunk.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.terrain.len()
    }

    /// Terrain at a tile, or `None` when the tile belongs to another chunk.
    #[must_use]
    pub fn terrain_at(&self, tile: TileCoord) -> Option<TerrainType> {
        self.rect().index_of(tile).map(|i| self.terrain[i])
    }

    /// Variant at a tile, or `None` when the tile belongs to another chunk.
    #[must_use]
    pub fn variant_at(&self, tile: TileCoord) -> Option<TileVariant> {
        self.rect().index_of(tile).map(|i| self.variants[i])
    }

    /// Row-major terrain slice.
    #[must_use]
    pub fn terrain(&self) -> &[TerrainType] {
        &self.terrain
    }

    /// Row-major variant slice.
    #[must_use]
    pub fn variants(&self) -> &[TileVariant] {
        &self.variants
    }

    /// Iterates `(tile, terrain, variant)` in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, TerrainType, TileVariant)> + '_ {
        let rect = self.rect();
        self.terrain
            .iter()
            .zip(&self.variants)
            .enumerate()
            .map(move |(i, (&terrain, &variant))| (rect.tile_at(i), terrain, variant))
    }

    /// Number of water tiles.
    #[must_use]
    pub fn water_count(&self) -> usize {
        self.terrain.iter().filter(|t| t.is_water()).count()
    }
}
