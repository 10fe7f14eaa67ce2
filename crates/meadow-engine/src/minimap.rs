//! ASCII minimap of resident terrain.
//!
//! One character per tile, rows top to bottom, columns left to right in tile
//! space (not screen space). Tiles outside the cache render as blanks.

use meadow_common::TileCoord;
use meadow_world::{ChunkCache, TileSink, TileVariant};

/// Largest radius rendered; larger requests are clamped.
pub const MAX_RADIUS: u32 = 512;

/// Character for a tile variant.
#[must_use]
pub const fn variant_char(variant: TileVariant) -> char {
    match variant {
        TileVariant::Grass => '.',
        TileVariant::Water => '~',
        TileVariant::WaterEdgeN => 'n',
        TileVariant::WaterEdgeE => 'e',
        TileVariant::WaterEdgeS => 's',
        TileVariant::WaterEdgeW => 'w',
        TileVariant::WaterConcaveN => 'N',
        TileVariant::WaterConcaveE => 'E',
        TileVariant::WaterConcaveS => 'S',
        TileVariant::WaterConcaveW => 'W',
    }
}

/// Renders the square of tiles within `radius` of `center`.
///
/// The center tile is marked with `@`.
#[must_use]
pub fn render_minimap<S: TileSink>(
    cache: &ChunkCache<S>,
    center: TileCoord,
    radius: u32,
) -> String {
    let radius = radius.min(MAX_RADIUS) as i32;
    let side = (2 * radius + 1) as usize;
    let mut out = String::with_capacity(side * (side + 1));
    let top_left = center.offset(-radius, -radius);
    let bottom_right = center.offset(radius, radius);

    for row in top_left.row..=bottom_right.row {
        for col in top_left.col..=bottom_right.col {
            let ch = if col == center.col && row == center.row {
                '@'
            } else {
                cache.get_tile_variant(col, row).map_or(' ', variant_char)
            };
            out.push(ch);
        }
        out.push('\n');
    }
    out
}
