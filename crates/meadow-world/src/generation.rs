//! Procedural chunk generation.

use meadow_common::ChunkCoord;
use tracing::trace;

use crate::chunk::ChunkTerrain;
use crate::classifier::{variant_in_grid, ClassifierParams, TerrainClassifier};
use crate::config::{WorldConfig, DEFAULT_PADDING};
use crate::terrain::TerrainType;

/// Procedural terrain generator.
///
/// Classifies each chunk over its own tile rectangle grown by a padding
/// margin, so clusters and neighbors near the chunk edge see context, but
/// only the chunk's own tiles are returned. A chunk never reads tiles of
/// another chunk.
#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    /// Land/water classifier
    classifier: TerrainClassifier,
    /// Padding margin in tiles
    padding: u32,
}

impl TerrainGenerator {
    /// Creates a new generator.
    #[must_use]
    pub fn new(classifier: TerrainClassifier, padding: u32) -> Self {
        Self {
            classifier,
            padding,
        }
    }

    /// Creates a generator from a world config.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        Self::new(TerrainClassifier::from_config(config), config.padding)
    }

    /// Creates a generator with default parameters.
    #[must_use]
    pub fn with_seed(seed: &str) -> Self {
        Self::new(
            TerrainClassifier::new(seed, ClassifierParams::default()),
            DEFAULT_PADDING,
        )
    }

    /// Returns the classifier.
    #[must_use]
    pub const fn classifier(&self) -> &TerrainClassifier {
        &self.classifier
    }

    /// Returns the classifier mutably (for smoothing changes).
    pub fn classifier_mut(&mut self) -> &mut TerrainClassifier {
        &mut self.classifier
    }

    /// Returns the padding margin.
    #[must_use]
    pub const fn padding(&self) -> u32 {
        self.padding
    }

    /// Generates a chunk using the classifier's current smoothing setting.
    #[must_use]
    pub fn generate_chunk_terrain(
        &self,
        chunk_col: i32,
        chunk_row: i32,
        chunk_size: u32,
    ) -> ChunkTerrain {
        self.generate_chunk(
            ChunkCoord::new(chunk_col, chunk_row),
            chunk_size,
            self.classifier.is_smoothing(),
        )
    }

    /// Generates a chunk with an explicit smoothing snapshot.
    #[must_use]
    pub fn generate_chunk(
        &self,
        coord: ChunkCoord,
        chunk_size: u32,
        smoothing: bool,
    ) -> ChunkTerrain {
        let chunk_rect = coord.tile_rect(chunk_size);
        let padded_rect = chunk_rect.expand(self.padding);

        // First pass: raw classification over the padded region
        let raw = self.classifier.classify_region(padded_rect);

        // Second pass: drop small clusters using the padding as context
        let filtered = self.classifier.suppress_small_clusters(&raw);

        // Third pass: terrain and variants for the chunk's own tiles
        let tile_count = chunk_rect.area();
        let mut terrain = Vec::with_capacity(tile_count);
        let mut variants = Vec::with_capacity(tile_count);
        for tile in chunk_rect.tiles() {
            terrain.push(TerrainType::from_water(filtered.is_water(tile)));
            variants.push(variant_in_grid(tile, &filtered, smoothing));
        }

        trace!(
            "Generated chunk {coord}: raw water {}, filtered water {}",
            raw.water_count(),
            filtered.water_count()
        );

        ChunkTerrain::new(coord, chunk_size, terrain, variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileVariant;
    use meadow_common::TileCoord;

    #[test]
    fn test_generation_deterministic() {
        let gen1 = TerrainGenerator::with_seed("procgentown");
        let gen2 = TerrainGenerator::with_seed("procgentown");

        let chunk1 = gen1.generate_chunk_terrain(0, 0, 16);
        let chunk2 = gen2.generate_chunk_terrain(0, 0, 16);
        let chunk3 = gen1.generate_chunk_terrain(0, 0, 16);

        assert_eq!(chunk1, chunk2);
        assert_eq!(chunk1, chunk3);
    }

    #[test]
    fn test_output_covers_exactly_the_chunk() {
        let gen = TerrainGenerator::with_seed("procgentown");
        let chunk = gen.generate_chunk_terrain(-2, 3, 16);
        assert_eq!(chunk.coord(), ChunkCoord::new(-2, 3));
        assert_eq!(chunk.tile_count(), 256);
        assert!(chunk.terrain_at(TileCoord::new(-32, 48)).is_some());
        assert!(chunk.terrain_at(TileCoord::new(-17, 63)).is_some());
        assert!(chunk.terrain_at(TileCoord::new(-33, 48)).is_none());
        assert!(chunk.terrain_at(TileCoord::new(-16, 48)).is_none());
    }

    #[test]
    fn test_terrain_matches_filtered_padded_region() {
        let gen = TerrainGenerator::with_seed("procgentown");
        let classifier = gen.classifier();
        for (col, row) in [(0, 0), (1, -1), (-3, 2)] {
            let chunk = gen.generate_chunk_terrain(col, row, 16);
            let padded = chunk.rect().expand(gen.padding());
            let filtered = classifier.suppress_small_clusters(&classifier.classify_region(padded));
            for (tile, terrain, _) in chunk.tiles() {
                assert_eq!(terrain.is_water(), filtered.is_water(tile));
            }
        }
    }

    #[test]
    fn test_filtered_water_is_raw_water() {
        let gen = TerrainGenerator::with_seed("clusters");
        let classifier = gen.classifier();
        for col in -2..2 {
            let chunk = gen.generate_chunk_terrain(col, 0, 16);
            for (tile, terrain, _) in chunk.tiles() {
                if terrain.is_water() {
                    assert!(classifier.is_water(tile.col, tile.row));
                }
            }
        }
    }

    #[test]
    fn test_smoothing_changes_variants_not_terrain() {
        let gen = TerrainGenerator::with_seed("procgentown");
        for col in -2..2 {
            let coord = ChunkCoord::new(col, 1);
            let smooth = gen.generate_chunk(coord, 16, true);
            let flat = gen.generate_chunk(coord, 16, false);
            assert_eq!(smooth.terrain(), flat.terrain());
            for (tile, terrain, variant) in flat.tiles() {
                let expected = if terrain.is_water() {
                    TileVariant::Water
                } else {
                    TileVariant::Grass
                };
                assert_eq!(variant, expected, "tile {tile}");
            }
        }
    }

    #[test]
    fn test_variants_consistent_with_terrain() {
        let gen = TerrainGenerator::with_seed("procgentown");
        let chunk = gen.generate_chunk_terrain(0, 0, 16);
        for (_, terrain, variant) in chunk.tiles() {
            assert_eq!(terrain.is_water(), variant != TileVariant::Grass);
        }
    }

    #[test]
    fn test_generation_independent_of_visit_order() {
        let gen = TerrainGenerator::with_seed("procgentown");
        let first = gen.generate_chunk_terrain(1, 0, 16);
        for col in -3..3 {
            let _ = gen.generate_chunk_terrain(col, -1, 16);
        }
        let again = TerrainGenerator::with_seed("procgentown").generate_chunk_terrain(1, 0, 16);
        assert_eq!(first, again);
        assert_eq!(first, gen.generate_chunk_terrain(1, 0, 16));
    }
}
