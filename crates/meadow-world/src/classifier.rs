//! Land/water classification and small cluster suppression.
//!
//! Classification runs in three steps over a rectangular tile region:
//! 1. Raw water flags from thresholded noise ([`TerrainClassifier::classify_region`])
//! 2. Removal of water clusters below a minimum size ([`suppress_small_clusters`])
//! 3. Autotile variant selection from the filtered flags ([`variant_in_grid`])

use std::collections::VecDeque;

use meadow_common::{TileCoord, TileRect};
use tracing::{info, trace};

use crate::config::{
    WorldConfig, DEFAULT_MIN_CLUSTER_SIZE, DEFAULT_NOISE_SCALE, DEFAULT_WATER_THRESHOLD,
};
use crate::noise_field::NoiseField;
use crate::terrain::{select_variant, Neighborhood, TerrainType, TileVariant};

/// Numeric parameters of the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    /// Noise units per tile
    pub noise_scale: f64,
    /// Normalized noise below this value is water
    pub water_threshold: f64,
    /// Water clusters smaller than this become grass
    pub min_cluster_size: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            noise_scale: DEFAULT_NOISE_SCALE,
            water_threshold: DEFAULT_WATER_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
        }
    }
}

impl From<&WorldConfig> for ClassifierParams {
    fn from(config: &WorldConfig) -> Self {
        Self {
            noise_scale: config.noise_scale,
            water_threshold: config.water_threshold,
            min_cluster_size: config.min_cluster_size,
        }
    }
}

/// Dense water flags over a tile rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaterGrid {
    /// Covered tiles
    rect: TileRect,
    /// Row-major water flags
    cells: Vec<bool>,
}

impl WaterGrid {
    /// Creates an all-grass grid.
    #[must_use]
    pub fn new(rect: TileRect) -> Self {
        Self {
            rect,
            cells: vec![false; rect.area()],
        }
    }

    /// Creates a grid from a water predicate evaluated at every tile.
    #[must_use]
    pub fn from_fn(rect: TileRect, mut is_water: impl FnMut(TileCoord) -> bool) -> Self {
        let cells = rect.tiles().map(&mut is_water).collect();
        Self { rect, cells }
    }

    /// Returns the covered rectangle.
    #[must_use]
    pub const fn rect(&self) -> TileRect {
        self.rect
    }

    /// Water flag at a tile, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, tile: TileCoord) -> Option<bool> {
        self.rect.index_of(tile).map(|i| self.cells[i])
    }

    /// Water flag at a tile; tiles outside the grid read as grass.
    #[must_use]
    pub fn is_water(&self, tile: TileCoord) -> bool {
        self.get(tile).unwrap_or(false)
    }

    /// Sets the flag at a tile. Returns false when outside the grid.
    pub fn set(&mut self, tile: TileCoord, is_water: bool) -> bool {
        match self.rect.index_of(tile) {
            Some(i) => {
                self.cells[i] = is_water;
                true
            },
            None => false,
        }
    }

    /// Number of water tiles.
    #[must_use]
    pub fn water_count(&self) -> usize {
        self.cells.iter().filter(|&&w| w).count()
    }
}

/// Decides land/water per tile from a seeded noise field.
#[derive(Debug, Clone)]
pub struct TerrainClassifier {
    /// Noise source
    noise: NoiseField,
    /// Thresholds and scale
    params: ClassifierParams,
    /// Whether edge/corner variants are selected
    smoothing: bool,
}

impl TerrainClassifier {
    /// Creates a classifier with smoothing enabled.
    #[must_use]
    pub fn new(seed: &str, params: ClassifierParams) -> Self {
        Self {
            noise: NoiseField::new(seed),
            params,
            smoothing: true,
        }
    }

    /// Creates a classifier from a world config.
    #[must_use]
    pub fn from_config(config: &WorldConfig) -> Self {
        let mut classifier = Self::new(&config.seed, ClassifierParams::from(config));
        classifier.smoothing = config.smoothing;
        classifier
    }

    /// Returns the noise field.
    #[must_use]
    pub const fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Returns the classifier parameters.
    #[must_use]
    pub const fn params(&self) -> &ClassifierParams {
        &self.params
    }

    /// Returns whether smoothing is enabled.
    #[must_use]
    pub const fn is_smoothing(&self) -> bool {
        self.smoothing
    }

    /// Enables or disables smoothing.
    pub fn set_smoothing(&mut self, enabled: bool) {
        if self.smoothing != enabled {
            info!("Terrain smoothing {}", if enabled { "enabled" } else { "disabled" });
            self.smoothing = enabled;
        }
    }

    /// Flips smoothing and returns the new value.
    pub fn toggle_smoothing(&mut self) -> bool {
        self.set_smoothing(!self.smoothing);
        self.smoothing
    }

    /// Raw water test for a single tile, before cluster suppression.
    #[must_use]
    pub fn is_water(&self, col: i32, row: i32) -> bool {
        let x = f64::from(col) * self.params.noise_scale;
        let y = f64::from(row) * self.params.noise_scale;
        self.noise.sample_normalized(x, y) < self.params.water_threshold
    }

    /// Raw water flags for every tile in a half-open rectangle.
    #[must_use]
    pub fn classify_region(&self, rect: TileRect) -> WaterGrid {
        WaterGrid::from_fn(rect, |tile| self.is_water(tile.col, tile.row))
    }

    /// Removes water clusters smaller than the configured minimum.
    #[must_use]
    pub fn suppress_small_clusters(&self, raw: &WaterGrid) -> WaterGrid {
        suppress_small_clusters(raw, self.params.min_cluster_size)
    }

    /// Variant of a tile under the current smoothing setting.
    #[must_use]
    pub fn variant_for(&self, tile: TileCoord, filtered: &WaterGrid) -> TileVariant {
        variant_in_grid(tile, filtered, self.smoothing)
    }
}

/// Reclassifies every 4-connected water cluster with fewer than `min_size`
/// tiles as grass.
///
/// Each tile is enqueued at most once across the whole pass. Flood fill is
/// confined to the grid, so a cluster cut by the grid edge is measured only
/// by its visible part.
#[must_use]
pub fn suppress_small_clusters(raw: &WaterGrid, min_size: usize) -> WaterGrid {
    let rect = raw.rect;
    let width = rect.width();
    let height = rect.height();
    let mut filtered = raw.clone();
    let mut visited = vec![false; raw.cells.len()];
    let mut queue = VecDeque::new();
    let mut cluster = Vec::new();
    let mut removed = 0usize;

    for start in 0..raw.cells.len() {
        if !raw.cells[start] || visited[start] {
            continue;
        }

        visited[start] = true;
        queue.push_back(start);
        cluster.clear();

        while let Some(index) = queue.pop_front() {
            cluster.push(index);
            let x = index % width;
            let y = index / width;

            let mut visit = |neighbor: usize| {
                if raw.cells[neighbor] && !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            };
            if x + 1 < width {
                visit(index + 1);
            }
            if x > 0 {
                visit(index - 1);
            }
            if y + 1 < height {
                visit(index + width);
            }
            if y > 0 {
                visit(index - width);
            }
        }

        if cluster.len() < min_size {
            for &index in &cluster {
                filtered.cells[index] = false;
            }
            removed += cluster.len();
        }
    }

    trace!("Cluster suppression over {:?} removed {removed} tiles", rect);
    filtered
}

/// Variant of a tile read from a filtered grid.
///
/// Neighbors outside the grid read as grass.
#[must_use]
pub fn variant_in_grid(tile: TileCoord, filtered: &WaterGrid, smoothing: bool) -> TileVariant {
    let terrain = TerrainType::from_water(filtered.is_water(tile));
    let neighbors = Neighborhood::around(tile, |t| filtered.is_water(t));
    select_variant(terrain, neighbors, smoothing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Builds a grid from ASCII art; `~` is water. Row 0 is the first line.
    fn grid_from_art(origin: TileCoord, art: &[&str]) -> WaterGrid {
        let width = art[0].len() as i32;
        let height = art.len() as i32;
        let rect = TileRect::new(origin.col, origin.row, origin.col + width, origin.row + height);
        WaterGrid::from_fn(rect, |t| {
            let line = art[(t.row - origin.row) as usize].as_bytes();
            line[(t.col - origin.col) as usize] == b'~'
        })
    }

    #[test]
    fn test_is_water_matches_threshold() {
        let classifier = TerrainClassifier::new("procgentown", ClassifierParams::default());
        for col in -30..30 {
            for row in -30..30 {
                let v = classifier
                    .noise()
                    .sample_normalized(f64::from(col) * 0.1, f64::from(row) * 0.1);
                assert_eq!(classifier.is_water(col, row), v < 0.2);
            }
        }
    }

    #[test]
    fn test_threshold_extremes() {
        let all_land = TerrainClassifier::new(
            "extremes",
            ClassifierParams {
                water_threshold: 0.0,
                ..Default::default()
            },
        );
        let all_water = TerrainClassifier::new(
            "extremes",
            ClassifierParams {
                water_threshold: 1.01,
                ..Default::default()
            },
        );
        let rect = TileRect::new(-5, -5, 5, 5);
        assert_eq!(all_land.classify_region(rect).water_count(), 0);
        assert_eq!(all_water.classify_region(rect).water_count(), 100);
    }

    #[test]
    fn test_classify_region_covers_rect() {
        let classifier = TerrainClassifier::new("procgentown", ClassifierParams::default());
        let rect = TileRect::new(-8, -8, 24, 24);
        let grid = classifier.classify_region(rect);
        assert_eq!(grid.rect(), rect);
        for tile in rect.tiles() {
            assert_eq!(grid.get(tile), Some(classifier.is_water(tile.col, tile.row)));
        }
        assert_eq!(grid.get(TileCoord::new(24, 0)), None);
    }

    #[test]
    fn test_small_clusters_removed() {
        let raw = grid_from_art(
            TileCoord::new(0, 0),
            &[
                "~~...~", //
                "~....~", //
                ".....~", //
                "..~..~", //
                "......", //
            ],
        );
        let filtered = suppress_small_clusters(&raw, 4);
        // 3-tile L and single tile removed
        assert!(!filtered.is_water(TileCoord::new(0, 0)));
        assert!(!filtered.is_water(TileCoord::new(1, 0)));
        assert!(!filtered.is_water(TileCoord::new(0, 1)));
        assert!(!filtered.is_water(TileCoord::new(2, 3)));
        // 4-tile column kept
        for row in 0..4 {
            assert!(filtered.is_water(TileCoord::new(5, row)));
        }
        assert_eq!(filtered.water_count(), 4);
    }

    #[test]
    fn test_diagonal_tiles_are_not_connected() {
        let raw = grid_from_art(
            TileCoord::new(-2, -2),
            &[
                "~...", //
                ".~..", //
                "..~.", //
                "...~", //
            ],
        );
        let filtered = suppress_small_clusters(&raw, 2);
        assert_eq!(filtered.water_count(), 0);
    }

    #[test]
    fn test_large_cluster_kept_with_holes() {
        let raw = grid_from_art(
            TileCoord::new(10, -4),
            &[
                "~~~~~", //
                "~...~", //
                "~~~~~", //
            ],
        );
        let filtered = suppress_small_clusters(&raw, 4);
        assert_eq!(filtered, raw);
    }

    #[test]
    fn test_min_size_zero_keeps_everything() {
        let raw = grid_from_art(TileCoord::new(0, 0), &["~.~", ".~."]);
        assert_eq!(suppress_small_clusters(&raw, 0), raw);
        assert_eq!(suppress_small_clusters(&raw, 1), raw);
    }

    #[test]
    fn test_variant_in_grid_reads_neighbors() {
        // Columns grow to the right, rows grow downward.
        // Tile (1, 1) has water at N (2, 1) and E (1, 2) only.
        let grid = grid_from_art(
            TileCoord::new(0, 0),
            &[
                "....", //
                ".~~.", //
                ".~..", //
            ],
        );
        let tile = TileCoord::new(1, 1);
        assert_eq!(variant_in_grid(tile, &grid, true), TileVariant::WaterConcaveS);
        assert_eq!(variant_in_grid(tile, &grid, false), TileVariant::Water);
        assert_eq!(
            variant_in_grid(TileCoord::new(0, 0), &grid, true),
            TileVariant::Grass
        );
    }

    #[test]
    fn test_variant_at_grid_edge_treats_outside_as_grass() {
        let grid = grid_from_art(TileCoord::new(0, 0), &["~~", "~~"]);
        // (1, 1): N (2, 1) and E (1, 2) lie outside the grid.
        assert_eq!(
            variant_in_grid(TileCoord::new(1, 1), &grid, true),
            TileVariant::WaterConcaveN
        );
    }

    #[test]
    fn test_smoothing_toggle() {
        let mut classifier = TerrainClassifier::new("toggle", ClassifierParams::default());
        assert!(classifier.is_smoothing());
        assert!(!classifier.toggle_smoothing());
        assert!(!classifier.is_smoothing());
        classifier.set_smoothing(true);
        assert!(classifier.is_smoothing());
    }

    fn component_size(raw: &WaterGrid, start: TileCoord) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(tile) = stack.pop() {
            let neighbors = [
                tile.offset(1, 0),
                tile.offset(-1, 0),
                tile.offset(0, 1),
                tile.offset(0, -1),
            ];
            for next in neighbors {
                if raw.is_water(next) && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.len()
    }

    proptest! {
        #[test]
        fn prop_suppression_matches_component_sizes(
            cells in proptest::collection::vec(any::<bool>(), 64),
            min_size in 0usize..8,
        ) {
            let rect = TileRect::new(-4, -4, 4, 4);
            let raw = WaterGrid::from_fn(rect, |t| cells[rect.index_of(t).unwrap_or(0)]);
            let filtered = suppress_small_clusters(&raw, min_size);
            prop_assert_eq!(filtered.rect(), rect);
            for tile in rect.tiles() {
                let expected = raw.is_water(tile) && component_size(&raw, tile) >= min_size;
                prop_assert_eq!(filtered.is_water(tile), expected);
            }
        }
    }
}
