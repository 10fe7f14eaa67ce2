//! Isometric tile ↔ world transform.
//!
//! ```text
//! world_x = (col - row) * step_x
//! world_y = (col + row) * step_y
//! ```
//!
//! The forward transform maps a tile to the top vertex of its diamond. The
//! inverse floors, so every point inside a diamond maps back to that tile.
//! Diamond vertices lie exactly on floor boundaries, so values within a few
//! ulps of an integer are snapped to it before flooring.

use glam::DVec2;
use meadow_common::TileCoord;

use crate::config::ProjectionConfig;

/// Snap tolerance in units of `f64::EPSILON`, relative to magnitude.
const SNAP_ULPS: f64 = 8.0;

/// Rounds `value` to the nearest integer if it is within rounding error of it.
fn snap(value: f64) -> f64 {
    let nearest = value.round();
    if (value - nearest).abs() <= SNAP_ULPS * f64::EPSILON * nearest.abs().max(1.0) {
        nearest
    } else {
        value
    }
}

/// Isometric projection with fixed horizontal and vertical steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjection {
    /// Half the diamond width
    step_x: f64,
    /// Half the diamond height
    step_y: f64,
}

impl IsoProjection {
    /// Creates a projection from raw steps. Both must be positive.
    #[must_use]
    pub fn new(step_x: f64, step_y: f64) -> Self {
        debug_assert!(step_x > 0.0 && step_y > 0.0);
        Self { step_x, step_y }
    }

    /// Derives steps from tile art dimensions and visual overlap.
    #[must_use]
    pub fn from_tile_art(tile_width: f64, tile_height: f64, overlap: f64) -> Self {
        Self::new((tile_width - overlap) / 2.0, (tile_height - overlap) / 2.0)
    }

    /// Creates a projection from config.
    #[must_use]
    pub fn from_config(config: &ProjectionConfig) -> Self {
        Self::from_tile_art(config.tile_width, config.tile_height, config.overlap)
    }

    /// Horizontal step.
    #[must_use]
    pub const fn step_x(&self) -> f64 {
        self.step_x
    }

    /// Vertical step.
    #[must_use]
    pub const fn step_y(&self) -> f64 {
        self.step_y
    }

    /// World position of a tile's top vertex.
    #[must_use]
    pub fn tile_to_world(&self, tile: TileCoord) -> DVec2 {
        let col = f64::from(tile.col);
        let row = f64::from(tile.row);
        DVec2::new((col - row) * self.step_x, (col + row) * self.step_y)
    }

    /// World position of a tile's center.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> DVec2 {
        self.tile_to_world(tile) + DVec2::new(0.0, self.step_y)
    }

    /// Tile whose diamond contains a world point.
    ///
    /// Points beyond the tile plane clamp to its edge tiles.
    #[must_use]
    pub fn world_to_tile(&self, point: DVec2) -> TileCoord {
        let sum = snap(point.y / self.step_y);
        let diff = snap(point.x / self.step_x);
        TileCoord::new(
            ((sum + diff) / 2.0).floor() as i32,
            ((sum - diff) / 2.0).floor() as i32,
        )
    }
}

impl Default for IsoProjection {
    fn default() -> Self {
        Self::from_config(&ProjectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_steps() {
        let projection = IsoProjection::default();
        assert!((projection.step_x() - 32.0).abs() < f64::EPSILON);
        assert!((projection.step_y() - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlap_shrinks_steps() {
        let projection = IsoProjection::from_tile_art(64.0, 32.0, 4.0);
        assert!((projection.step_x() - 30.0).abs() < f64::EPSILON);
        assert!((projection.step_y() - 14.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forward_known_values() {
        let projection = IsoProjection::default();
        assert_eq!(projection.tile_to_world(TileCoord::new(0, 0)), DVec2::ZERO);
        assert_eq!(
            projection.tile_to_world(TileCoord::new(1, 0)),
            DVec2::new(32.0, 16.0)
        );
        assert_eq!(
            projection.tile_to_world(TileCoord::new(0, 1)),
            DVec2::new(-32.0, 16.0)
        );
        assert_eq!(
            projection.tile_to_world(TileCoord::new(-2, -3)),
            DVec2::new(32.0, -80.0)
        );
    }

    #[test]
    fn test_points_inside_diamond_map_to_tile() {
        let projection = IsoProjection::default();
        let tile = TileCoord::new(3, -2);
        let center = projection.tile_center(tile);
        assert_eq!(projection.world_to_tile(center), tile);
        // Just inside each vertex of the diamond
        let inside = [
            center + DVec2::new(0.0, -15.9),
            center + DVec2::new(31.9, 0.0),
            center + DVec2::new(0.0, 15.9),
            center + DVec2::new(-31.9, 0.0),
        ];
        for point in inside {
            assert_eq!(projection.world_to_tile(point), tile, "point {point}");
        }
    }

    #[test]
    fn test_negative_points_floor() {
        let projection = IsoProjection::default();
        assert_eq!(
            projection.world_to_tile(DVec2::new(0.0, -1.0)),
            TileCoord::new(-1, -1)
        );
    }

    #[test]
    fn test_fractional_overlap_roundtrip() {
        let projection = IsoProjection::from_tile_art(64.0, 32.0, 0.3);
        for col in -2000..2000 {
            for row in -50..50 {
                let tile = TileCoord::new(col, row);
                assert_eq!(projection.world_to_tile(projection.tile_to_world(tile)), tile);
                assert_eq!(projection.world_to_tile(projection.tile_center(tile)), tile);
            }
        }
    }

    #[test]
    fn test_far_points_clamp_to_edge() {
        let projection = IsoProjection::default();
        let far = projection.tile_to_world(TileCoord::new(i32::MAX, 0)) * 4.0;
        assert_eq!(projection.world_to_tile(far).col, i32::MAX);
    }

    proptest! {
        #[test]
        fn prop_projection_roundtrip(
            col in -1_000_000i32..1_000_000,
            row in -1_000_000i32..1_000_000,
        ) {
            let projection = IsoProjection::default();
            let tile = TileCoord::new(col, row);
            prop_assert_eq!(projection.world_to_tile(projection.tile_to_world(tile)), tile);
            prop_assert_eq!(projection.world_to_tile(projection.tile_center(tile)), tile);
        }

        #[test]
        fn prop_projection_roundtrip_any_tile_art(
            tile_width in 2.0f64..512.0,
            tile_height in 2.0f64..512.0,
            overlap in 0.0f64..1.0,
            col in -1_000_000i32..1_000_000,
            row in -1_000_000i32..1_000_000,
        ) {
            let projection = IsoProjection::from_tile_art(tile_width, tile_height, overlap);
            let tile = TileCoord::new(col, row);
            prop_assert_eq!(projection.world_to_tile(projection.tile_to_world(tile)), tile);
            prop_assert_eq!(projection.world_to_tile(projection.tile_center(tile)), tile);
        }
    }
}
