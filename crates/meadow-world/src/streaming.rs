//! Viewport-driven chunk streaming.
//!
//! The cache keeps every chunk inside the *required set* resident: the chunks
//! covering the viewport's tile bounding box, grown by a render distance on
//! every side. Each update is a set difference between required and resident
//! chunk keys; there is no recency ordering.
//!
//! ```text
//! viewport ──► tile bbox ──► chunk bbox ± render_distance ──► required set
//!                                                              │
//!          evict (resident − required)  ◄──────────────────────┤
//!          generate (required − resident) ◄────────────────────┘
//! ```
//!
//! Renderers observe residency through a [`TileSink`]: every tile of a new
//! chunk is registered once, every tile of an evicted chunk is unregistered
//! once, and the full renderable tile set is republished whenever it changes.

use ahash::AHashMap;
use glam::DVec2;
use meadow_common::{ChunkCoord, TileCoord};
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::chunk::ChunkTerrain;
use crate::config::WorldConfig;
use crate::generation::TerrainGenerator;
use crate::map_data::MapData;
use crate::projection::IsoProjection;
use crate::terrain::{TerrainType, TileVariant};
use crate::WorldResult;

/// Zoom values below this are clamped to keep the required set bounded.
pub const MIN_ZOOM: f64 = 0.05;

/// Camera view in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// World position at the center of the screen
    pub center: DVec2,
    /// Screen width in pixels
    pub width: f64,
    /// Screen height in pixels
    pub height: f64,
    /// Pixels per world unit
    pub zoom: f64,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(center_x: f64, center_y: f64, width: f64, height: f64, zoom: f64) -> Self {
        Self {
            center: DVec2::new(center_x, center_y),
            width,
            height,
            zoom,
        }
    }

    /// Half the visible world extent on each axis.
    #[must_use]
    pub fn half_extents(&self) -> DVec2 {
        let zoom = self.zoom.max(MIN_ZOOM);
        DVec2::new(self.width.abs(), self.height.abs()) / (2.0 * zoom)
    }

    /// World-space corners of the visible rectangle.
    #[must_use]
    pub fn corners(&self) -> [DVec2; 4] {
        let half = self.half_extents();
        [
            self.center + DVec2::new(-half.x, -half.y),
            self.center + DVec2::new(half.x, -half.y),
            self.center + DVec2::new(half.x, half.y),
            self.center + DVec2::new(-half.x, half.y),
        ]
    }
}

/// Inclusive rectangle of chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkRange {
    /// Lowest chunk (inclusive)
    pub min: ChunkCoord,
    /// Highest chunk (inclusive)
    pub max: ChunkCoord,
}

impl ChunkRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: ChunkCoord, max: ChunkCoord) -> Self {
        Self { min, max }
    }

    /// Checks whether a chunk lies inside the range.
    #[must_use]
    pub const fn contains(&self, coord: ChunkCoord) -> bool {
        coord.col >= self.min.col
            && coord.col <= self.max.col
            && coord.row >= self.min.row
            && coord.row <= self.max.row
    }

    /// Number of chunks in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        let cols = (i64::from(self.max.col) - i64::from(self.min.col) + 1).max(0);
        let rows = (i64::from(self.max.row) - i64::from(self.min.row) + 1).max(0);
        (cols * rows) as usize
    }

    /// Chunks whose padded tile rectangle lies inside the tile plane.
    #[must_use]
    pub fn plane(chunk_size: u32, padding: u32) -> Self {
        let size = i64::from(chunk_size.max(1));
        let pad = i64::from(padding);
        // Ceiling division for the lower bound
        let lo = -(-(i64::from(i32::MIN) + pad)).div_euclid(size);
        let hi = (i64::from(i32::MAX) - pad).div_euclid(size) - 1;
        Self::new(
            ChunkCoord::new(lo as i32, lo as i32),
            ChunkCoord::new(hi as i32, hi as i32),
        )
    }

    /// Chunks present in both ranges.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self::new(
            ChunkCoord::new(self.min.col.max(other.min.col), self.min.row.max(other.min.row)),
            ChunkCoord::new(self.max.col.min(other.max.col), self.max.row.min(other.max.row)),
        )
    }

    /// Returns true if the range holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates chunks in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> {
        let (min_col, max_col) = (self.min.col, self.max.col);
        (self.min.row..=self.max.row)
            .flat_map(move |row| (min_col..=max_col).map(move |col| ChunkCoord::new(col, row)))
    }
}

/// Opaque handle identifying one tile's residency.
///
/// Handles are never reused within a cache's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyHandle(u64);

impl ProxyHandle {
    /// Returns the raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// One renderable tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTile {
    /// Tile coordinate
    pub tile: TileCoord,
    /// Logical terrain
    pub terrain: TerrainType,
    /// Autotile variant
    pub variant: TileVariant,
}

/// Receiver of tile residency changes.
///
/// The cache only promises that `register_tile` and `unregister_tile`
/// bracket each tile's residency, and that `publish` receives the complete
/// renderable set after any change.
pub trait TileSink {
    /// A tile became resident.
    fn register_tile(&mut self, proxy: ProxyHandle, tile: TileCoord);

    /// A tile stopped being resident.
    fn unregister_tile(&mut self, tile: TileCoord);

    /// The renderable tile set changed. Tiles arrive in back-to-front
    /// isometric draw order.
    fn publish(&mut self, tiles: &[RenderTile]);
}

/// Sink that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TileSink for NullSink {
    fn register_tile(&mut self, _proxy: ProxyHandle, _tile: TileCoord) {}

    fn unregister_tile(&mut self, _tile: TileCoord) {}

    fn publish(&mut self, _tiles: &[RenderTile]) {}
}

/// Result of one cache update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSummary {
    /// Chunks generated by this update
    pub created: usize,
    /// Chunks evicted by this update
    pub evicted: usize,
}

impl UpdateSummary {
    /// Returns true if residency changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.created > 0 || self.evicted > 0
    }
}

/// Lifetime counters of a cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Currently resident chunks
    pub resident_chunks: usize,
    /// Currently indexed tiles
    pub resident_tiles: usize,
    /// Chunks generated since creation, including regenerations
    pub chunks_generated: u64,
    /// Chunks evicted since creation
    pub chunks_evicted: u64,
    /// Number of republished tile sets
    pub publishes: u64,
    /// Chunks generated by the last update
    pub last_created: usize,
    /// Chunks evicted by the last update
    pub last_evicted: usize,
}

/// A resident chunk and the proxies registered for its tiles.
#[derive(Debug)]
struct ResidentChunk {
    terrain: ChunkTerrain,
    proxies: Vec<(TileCoord, ProxyHandle)>,
}

/// Keeps the chunks around a viewport generated and evicts the rest.
pub struct ChunkCache<S: TileSink = NullSink> {
    /// Terrain generator
    generator: TerrainGenerator,
    /// Tile ↔ world transform
    projection: IsoProjection,
    /// Chunk size in tiles
    chunk_size: u32,
    /// Extra chunks around the viewport
    render_distance: u32,
    /// Resident chunks
    chunks: AHashMap<ChunkCoord, ResidentChunk>,
    /// Terrain of every resident tile
    map_data: MapData,
    /// Residency observer
    sink: S,
    /// Next proxy handle value
    next_proxy: u64,
    /// Required set of the last update
    required: Option<ChunkRange>,
    /// Whether the renderable set changed since the last publish
    dirty: bool,
    /// Lifetime counters
    stats: CacheStats,
}

impl ChunkCache<NullSink> {
    /// Creates a cache without a renderer attached.
    pub fn headless(config: &WorldConfig) -> WorldResult<Self> {
        Self::new(config, NullSink)
    }
}

impl<S: TileSink> ChunkCache<S> {
    /// Creates a cache from a validated config.
    pub fn new(config: &WorldConfig, sink: S) -> WorldResult<Self> {
        config.validate()?;
        info!(
            "Creating chunk cache: seed={:?}, chunk_size={}, padding={}, render_distance={}",
            config.seed, config.chunk_size, config.padding, config.render_distance
        );

        Ok(Self {
            generator: TerrainGenerator::from_config(config),
            projection: IsoProjection::from_config(&config.projection),
            chunk_size: config.chunk_size,
            render_distance: config.render_distance,
            chunks: AHashMap::new(),
            map_data: MapData::new(),
            sink,
            next_proxy: 1,
            required: None,
            dirty: false,
            stats: CacheStats::default(),
        })
    }

    /// Returns the chunk size.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Returns the render distance.
    #[must_use]
    pub const fn render_distance(&self) -> u32 {
        self.render_distance
    }

    /// Returns the projection.
    #[must_use]
    pub const fn projection(&self) -> &IsoProjection {
        &self.projection
    }

    /// Returns the generator.
    #[must_use]
    pub const fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Returns the tile index.
    #[must_use]
    pub const fn map_data(&self) -> &MapData {
        &self.map_data
    }

    /// Returns the sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Returns the required set of the last update.
    #[must_use]
    pub const fn required(&self) -> Option<ChunkRange> {
        self.required
    }

    /// Returns lifetime counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            resident_chunks: self.chunks.len(),
            resident_tiles: self.map_data.len(),
            ..self.stats
        }
    }

    /// Returns the number of resident chunks.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    /// Checks if a chunk is resident.
    #[must_use]
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Returns a resident chunk.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&ChunkTerrain> {
        self.chunks.get(&coord).map(|c| &c.terrain)
    }

    /// Resident chunk coordinates, sorted.
    #[must_use]
    pub fn resident_chunks(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<_> = self.chunks.keys().copied().collect();
        coords.sort_unstable();
        coords
    }

    /// Terrain at a tile, or `None` (unknown) when its chunk is not resident.
    #[must_use]
    pub fn get_tile_type(&self, col: i32, row: i32) -> Option<TerrainType> {
        self.map_data.get(TileCoord::new(col, row))
    }

    /// Variant at a tile, or `None` when its chunk is not resident.
    #[must_use]
    pub fn get_tile_variant(&self, col: i32, row: i32) -> Option<TileVariant> {
        let tile = TileCoord::new(col, row);
        self.chunks
            .get(&tile.to_chunk_coord(self.chunk_size))
            .and_then(|c| c.terrain.variant_at(tile))
    }

    /// Returns whether smoothing is enabled.
    #[must_use]
    pub const fn is_smoothing(&self) -> bool {
        self.generator.classifier().is_smoothing()
    }

    /// Enables or disables smoothing. Resident chunks are regenerated when
    /// the value changes so variants never mix settings.
    pub fn set_smoothing(&mut self, enabled: bool) {
        if self.is_smoothing() == enabled {
            return;
        }
        self.generator.classifier_mut().set_smoothing(enabled);
        self.regenerate_all_chunks();
    }

    /// Flips smoothing and returns the new value.
    pub fn toggle_smoothing(&mut self) -> bool {
        let enabled = !self.is_smoothing();
        self.set_smoothing(enabled);
        enabled
    }

    /// Chunks required for a viewport.
    ///
    /// Clipped to chunks that can be generated with their padding inside the
    /// tile plane.
    #[must_use]
    pub fn required_chunks(&self, viewport: &Viewport) -> ChunkRange {
        let mut min = TileCoord::new(i32::MAX, i32::MAX);
        let mut max = TileCoord::new(i32::MIN, i32::MIN);
        for corner in viewport.corners() {
            let tile = self.projection.world_to_tile(corner);
            min.col = min.col.min(tile.col);
            min.row = min.row.min(tile.row);
            max.col = max.col.max(tile.col);
            max.row = max.row.max(tile.row);
        }

        let distance = self.render_distance as i32;
        let min_chunk = min.to_chunk_coord(self.chunk_size);
        let max_chunk = max.to_chunk_coord(self.chunk_size);
        let required = ChunkRange::new(
            ChunkCoord::new(
                min_chunk.col.saturating_sub(distance),
                min_chunk.row.saturating_sub(distance),
            ),
            ChunkCoord::new(
                max_chunk.col.saturating_add(distance),
                max_chunk.row.saturating_add(distance),
            ),
        );
        required.intersect(&ChunkRange::plane(self.chunk_size, self.generator.padding()))
    }

    /// Brings residency in line with a viewport.
    ///
    /// Evicts every resident chunk outside the required set, generates every
    /// missing one, and republishes the renderable set if anything changed.
    /// Fully resolves before returning.
    pub fn update_visible_chunks(&mut self, viewport: &Viewport) -> UpdateSummary {
        let required = self.required_chunks(viewport);
        if self.required != Some(required) {
            debug!(
                "Required chunks {} .. {} ({} chunks)",
                required.min,
                required.max,
                required.len()
            );
            self.required = Some(required);
        }

        // Unload chunks outside the required set
        let mut stale: Vec<_> = self
            .chunks
            .keys()
            .filter(|coord| !required.contains(**coord))
            .copied()
            .collect();
        stale.sort_unstable();
        for coord in &stale {
            self.evict_chunk(*coord);
        }

        // Load missing chunks
        let missing: Vec<_> = required
            .iter()
            .filter(|coord| !self.chunks.contains_key(coord))
            .collect();
        let generated = self.generate_batch(&missing);
        for terrain in generated {
            self.insert_chunk(terrain);
        }

        let summary = UpdateSummary {
            created: missing.len(),
            evicted: stale.len(),
        };
        self.stats.last_created = summary.created;
        self.stats.last_evicted = summary.evicted;
        if summary.changed() {
            debug!(
                "Chunk update: {} created, {} evicted, {} resident",
                summary.created,
                summary.evicted,
                self.chunks.len()
            );
            self.dirty = true;
        }
        self.publish_if_dirty();
        summary
    }

    /// Regenerates every resident chunk in place.
    ///
    /// The required set and tile registrations are unchanged; the renderable
    /// set is republished.
    pub fn regenerate_all_chunks(&mut self) {
        let coords = self.resident_chunks();
        if coords.is_empty() {
            return;
        }

        info!("Regenerating {} resident chunks", coords.len());
        for terrain in self.generate_batch(&coords) {
            for (tile, tile_terrain, _) in terrain.tiles() {
                self.map_data.insert(tile, tile_terrain);
            }
            if let Some(resident) = self.chunks.get_mut(&terrain.coord()) {
                resident.terrain = terrain;
            }
        }
        self.dirty = true;
        self.publish_if_dirty();
    }

    /// Evicts every resident chunk.
    pub fn clear(&mut self) {
        for coord in self.resident_chunks() {
            self.evict_chunk(coord);
        }
        self.required = None;
        self.dirty = true;
        self.publish_if_dirty();
    }

    /// All resident tiles in back-to-front draw order.
    #[must_use]
    pub fn render_tiles(&self) -> Vec<RenderTile> {
        let mut tiles: Vec<_> = self
            .chunks
            .values()
            .flat_map(|c| c.terrain.tiles())
            .map(|(tile, terrain, variant)| RenderTile {
                tile,
                terrain,
                variant,
            })
            .collect();
        tiles.sort_unstable_by_key(|t| (t.tile.depth(), t.tile.col));
        tiles
    }

    /// Generates a batch of chunks against one smoothing snapshot.
    fn generate_batch(&mut self, coords: &[ChunkCoord]) -> Vec<ChunkTerrain> {
        let smoothing = self.is_smoothing();
        let generator = &self.generator;
        let chunk_size = self.chunk_size;
        trace!(
            "Generating {} chunks (smoothing={smoothing})",
            coords.len()
        );
        let generated: Vec<_> = coords
            .par_iter()
            .map(|&coord| generator.generate_chunk(coord, chunk_size, smoothing))
            .collect();
        self.stats.chunks_generated += generated.len() as u64;
        generated
    }

    /// Stores a freshly generated chunk and registers its tiles.
    fn insert_chunk(&mut self, terrain: ChunkTerrain) {
        let coord = terrain.coord();
        debug!("Loading chunk {coord}");

        let mut proxies = Vec::with_capacity(terrain.tile_count());
        for (tile, tile_terrain, _) in terrain.tiles() {
            self.map_data.insert(tile, tile_terrain);
            let proxy = ProxyHandle(self.next_proxy);
            self.next_proxy += 1;
            self.sink.register_tile(proxy, tile);
            proxies.push((tile, proxy));
        }

        self.chunks.insert(coord, ResidentChunk { terrain, proxies });
    }

    /// Detaches a chunk's tiles from the sink, then drops its data.
    fn evict_chunk(&mut self, coord: ChunkCoord) {
        let Some(resident) = self.chunks.remove(&coord) else {
            return;
        };
        debug!("Unloading chunk {coord}");

        for &(tile, _) in &resident.proxies {
            self.sink.unregister_tile(tile);
        }
        for (tile, _, _) in resident.terrain.tiles() {
            self.map_data.remove(tile);
        }
        self.stats.chunks_evicted += 1;
    }

    /// Republishes the renderable set if it changed.
    fn publish_if_dirty(&mut self) {
        if !self.dirty {
            return;
        }
        let tiles = self.render_tiles();
        trace!("Publishing {} tiles", tiles.len());
        self.sink.publish(&tiles);
        self.stats.publishes += 1;
        self.dirty = false;
    }
}

impl<S: TileSink> std::fmt::Debug for ChunkCache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkCache")
            .field("chunk_size", &self.chunk_size)
            .field("render_distance", &self.render_distance)
            .field("required", &self.required)
            .field("loaded_chunks", &self.chunks.len())
            .field("resident_tiles", &self.map_data.len())
            .field("smoothing", &self.is_smoothing())
            .finish_non_exhaustive()
    }
}
