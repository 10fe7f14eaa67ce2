//! Terrain types and autotile variants.
//!
//! ## Neighbor naming
//!
//! Neighbor directions follow the isometric screen layout rather than the
//! grid axes:
//!
//! ```text
//! N = (col + 1, row)
//! E = (col, row + 1)
//! S = (col - 1, row)
//! W = (col, row - 1)
//! ```

use meadow_common::TileCoord;
use serde::{Deserialize, Serialize};

/// Logical terrain classification of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainType {
    /// Land
    Grass,
    /// Water
    Water,
}

impl TerrainType {
    /// Converts a water flag into a terrain type.
    #[must_use]
    pub const fn from_water(is_water: bool) -> Self {
        if is_water {
            Self::Water
        } else {
            Self::Grass
        }
    }

    /// Returns true for water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water)
    }
}

/// Autotile rendering variant of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileVariant {
    /// Open water
    Water,
    /// Plain grass
    Grass,
    /// Water with land on the N side
    WaterEdgeN,
    /// Water with land on the E side
    WaterEdgeE,
    /// Water with land on the S side
    WaterEdgeS,
    /// Water with land on the W side
    WaterEdgeW,
    /// Water corner with land on the N and E sides
    WaterConcaveN,
    /// Water corner with land on the E and S sides
    WaterConcaveE,
    /// Water corner with land on the S and W sides
    WaterConcaveS,
    /// Water corner with land on the W and N sides
    WaterConcaveW,
}

impl TileVariant {
    /// Every variant, in asset order.
    pub const ALL: [Self; 10] = [
        Self::Water,
        Self::Grass,
        Self::WaterEdgeN,
        Self::WaterEdgeE,
        Self::WaterEdgeS,
        Self::WaterEdgeW,
        Self::WaterConcaveN,
        Self::WaterConcaveE,
        Self::WaterConcaveS,
        Self::WaterConcaveW,
    ];

    /// Asset key a renderer can use to look up the tile image.
    #[must_use]
    pub const fn asset_key(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Grass => "grass",
            Self::WaterEdgeN => "water-edge-n",
            Self::WaterEdgeE => "water-edge-e",
            Self::WaterEdgeS => "water-edge-s",
            Self::WaterEdgeW => "water-edge-w",
            Self::WaterConcaveN => "water-concave-n",
            Self::WaterConcaveE => "water-concave-e",
            Self::WaterConcaveS => "water-concave-s",
            Self::WaterConcaveW => "water-concave-w",
        }
    }

    /// Returns true for straight edge variants.
    #[must_use]
    pub const fn is_edge(self) -> bool {
        matches!(
            self,
            Self::WaterEdgeN | Self::WaterEdgeE | Self::WaterEdgeS | Self::WaterEdgeW
        )
    }

    /// Returns true for concave corner variants.
    #[must_use]
    pub const fn is_concave(self) -> bool {
        matches!(
            self,
            Self::WaterConcaveN | Self::WaterConcaveE | Self::WaterConcaveS | Self::WaterConcaveW
        )
    }
}

/// Water flags of a tile's four axis neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Neighborhood {
    /// Neighbor at (col + 1, row)
    pub n: bool,
    /// Neighbor at (col, row + 1)
    pub e: bool,
    /// Neighbor at (col - 1, row)
    pub s: bool,
    /// Neighbor at (col, row - 1)
    pub w: bool,
}

impl Neighborhood {
    /// Creates a neighborhood from explicit flags.
    #[must_use]
    pub const fn new(n: bool, e: bool, s: bool, w: bool) -> Self {
        Self { n, e, s, w }
    }

    /// Builds a neighborhood by querying a water predicate around `tile`.
    #[must_use]
    pub fn around(tile: TileCoord, mut is_water: impl FnMut(TileCoord) -> bool) -> Self {
        Self {
            n: is_water(tile.offset(1, 0)),
            e: is_water(tile.offset(0, 1)),
            s: is_water(tile.offset(-1, 0)),
            w: is_water(tile.offset(0, -1)),
        }
    }

    /// Number of water neighbors.
    #[must_use]
    pub const fn water_count(self) -> u32 {
        self.n as u32 + self.e as u32 + self.s as u32 + self.w as u32
    }

    /// Variant for a water tile surrounded by this neighborhood.
    ///
    /// Unlisted shapes (isolated tiles, single neighbors, opposite pairs)
    /// fall back to open water.
    #[must_use]
    pub const fn water_variant(self) -> TileVariant {
        match (self.n, self.e, self.s, self.w) {
            (false, true, true, true) => TileVariant::WaterEdgeN,
            (true, false, true, true) => TileVariant::WaterEdgeE,
            (true, true, false, true) => TileVariant::WaterEdgeS,
            (true, true, true, false) => TileVariant::WaterEdgeW,
            (false, false, true, true) => TileVariant::WaterConcaveN,
            (true, false, false, true) => TileVariant::WaterConcaveE,
            (true, true, false, false) => TileVariant::WaterConcaveS,
            (false, true, true, false) => TileVariant::WaterConcaveW,
            _ => TileVariant::Water,
        }
    }
}

/// Picks the variant for a tile from its own terrain and neighborhood.
#[must_use]
pub const fn select_variant(
    terrain: TerrainType,
    neighbors: Neighborhood,
    smoothing: bool,
) -> TileVariant {
    match terrain {
        TerrainType::Grass => TileVariant::Grass,
        TerrainType::Water if !smoothing => TileVariant::Water,
        TerrainType::Water => neighbors.water_variant(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_neighborhoods() -> impl Iterator<Item = Neighborhood> {
        (0u8..16).map(|bits| {
            Neighborhood::new(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0, bits & 8 != 0)
        })
    }

    #[test]
    fn test_variant_totality() {
        let variants: Vec<_> = all_neighborhoods()
            .map(|n| select_variant(TerrainType::Water, n, true))
            .collect();

        assert_eq!(variants.len(), 16);
        assert_eq!(variants.iter().filter(|v| v.is_edge()).count(), 4);
        assert_eq!(variants.iter().filter(|v| v.is_concave()).count(), 4);
        assert_eq!(
            variants.iter().filter(|v| **v == TileVariant::Water).count(),
            8
        );
        assert!(!variants.contains(&TileVariant::Grass));
    }

    #[test]
    fn test_each_edge_and_corner_used_once() {
        let variants: Vec<_> = all_neighborhoods()
            .map(|n| select_variant(TerrainType::Water, n, true))
            .collect();
        for variant in TileVariant::ALL {
            if variant.is_edge() || variant.is_concave() {
                assert_eq!(variants.iter().filter(|v| **v == variant).count(), 1);
            }
        }
    }

    #[test]
    fn test_edges_named_for_land_side() {
        let water = |n, e, s, w| Neighborhood::new(n, e, s, w).water_variant();
        assert_eq!(water(false, true, true, true), TileVariant::WaterEdgeN);
        assert_eq!(water(true, false, true, true), TileVariant::WaterEdgeE);
        assert_eq!(water(true, true, false, true), TileVariant::WaterEdgeS);
        assert_eq!(water(true, true, true, false), TileVariant::WaterEdgeW);
    }

    #[test]
    fn test_concave_pairing() {
        let water = |n, e, s, w| Neighborhood::new(n, e, s, w).water_variant();
        // {S, W} water
        assert_eq!(water(false, false, true, true), TileVariant::WaterConcaveN);
        // {N, W} water
        assert_eq!(water(true, false, false, true), TileVariant::WaterConcaveE);
        // {N, E} water
        assert_eq!(water(true, true, false, false), TileVariant::WaterConcaveS);
        // {S, E} water
        assert_eq!(water(false, true, true, false), TileVariant::WaterConcaveW);
    }

    #[test]
    fn test_fallback_shapes_are_water() {
        let water = |n, e, s, w| Neighborhood::new(n, e, s, w).water_variant();
        assert_eq!(water(true, true, true, true), TileVariant::Water);
        assert_eq!(water(false, false, false, false), TileVariant::Water);
        assert_eq!(water(true, false, true, false), TileVariant::Water);
        assert_eq!(water(false, true, false, true), TileVariant::Water);
        assert_eq!(water(false, true, false, false), TileVariant::Water);
    }

    #[test]
    fn test_grass_and_unsmoothed() {
        for n in all_neighborhoods() {
            assert_eq!(select_variant(TerrainType::Grass, n, true), TileVariant::Grass);
            assert_eq!(select_variant(TerrainType::Water, n, false), TileVariant::Water);
        }
    }

    #[test]
    fn test_neighborhood_around_directions() {
        let center = TileCoord::new(3, 1);
        let hood = Neighborhood::around(center, |t| {
            t == TileCoord::new(4, 1) || t == TileCoord::new(3, 0)
        });
        assert_eq!(hood, Neighborhood::new(true, false, false, true));
        assert_eq!(hood.water_count(), 2);
    }
}
