//! Coordinate types for tiles, chunks, and tile rectangles.
//!
//! The world is an unbounded tile plane. Every tile is addressed by a signed
//! `(col, row)` pair; chunks partition that plane into square blocks of a
//! fixed size. All chunk math uses floored (Euclidean) division so negative
//! coordinates land in the chunk to their lower-left rather than rounding
//! toward zero.

use serde::{Deserialize, Serialize};

/// Tile coordinate (the sole key identifying a tile).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index
    pub col: i32,
    /// Row index
    pub row: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Packs the coordinate into a single 64-bit key.
    ///
    /// Column occupies the high 32 bits, row the low 32 bits.
    #[must_use]
    pub const fn packed(self) -> u64 {
        ((self.col as u32 as u64) << 32) | (self.row as u32 as u64)
    }

    /// Unpacks a key produced by [`TileCoord::packed`].
    #[must_use]
    pub const fn from_packed(key: u64) -> Self {
        Self {
            col: (key >> 32) as u32 as i32,
            row: key as u32 as i32,
        }
    }

    /// Returns the coordinate offset by the given deltas, saturating at the
    /// edge of the tile plane.
    #[must_use]
    pub const fn offset(self, d_col: i32, d_row: i32) -> Self {
        Self {
            col: self.col.saturating_add(d_col),
            row: self.row.saturating_add(d_row),
        }
    }

    /// Converts to the coordinate of the chunk containing this tile.
    #[must_use]
    pub const fn to_chunk_coord(self, chunk_size: u32) -> ChunkCoord {
        let size = chunk_size as i64;
        ChunkCoord {
            col: (self.col as i64).div_euclid(size) as i32,
            row: (self.row as i64).div_euclid(size) as i32,
        }
    }

    /// Isometric draw depth; tiles with a larger depth are drawn later.
    #[must_use]
    pub const fn depth(self) -> i64 {
        self.col as i64 + self.row as i64
    }
}

impl std::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Chunk coordinate (identifies a chunk in the chunk grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Column in chunk space
    pub col: i32,
    /// Row in chunk space
    pub row: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns the first tile (lowest col and row) owned by this chunk.
    ///
    /// Computed in `i64` and clamped to the tile plane.
    #[must_use]
    pub const fn origin_tile(self, chunk_size: u32) -> TileCoord {
        let size = chunk_size as i64;
        TileCoord {
            col: clamp_to_i32(self.col as i64 * size),
            row: clamp_to_i32(self.row as i64 * size),
        }
    }

    /// Returns the half-open tile rectangle owned by this chunk.
    ///
    /// Chunks reaching past the edge of the tile plane are clipped to it.
    #[must_use]
    pub const fn tile_rect(self, chunk_size: u32) -> TileRect {
        let size = chunk_size as i64;
        let min_col = self.col as i64 * size;
        let min_row = self.row as i64 * size;
        TileRect::new(
            clamp_to_i32(min_col),
            clamp_to_i32(min_row),
            clamp_to_i32(min_col + size),
            clamp_to_i32(min_row + size),
        )
    }

    /// Checks whether this chunk, grown by `padding` tiles on every side,
    /// lies entirely inside the tile plane.
    #[must_use]
    pub const fn fits_padded(self, chunk_size: u32, padding: u32) -> bool {
        let size = chunk_size as i64;
        let pad = padding as i64;
        let min_col = self.col as i64 * size - pad;
        let min_row = self.row as i64 * size - pad;
        let max_col = (self.col as i64 + 1) * size + pad;
        let max_row = (self.row as i64 + 1) * size + pad;
        min_col >= i32::MIN as i64
            && min_row >= i32::MIN as i64
            && max_col <= i32::MAX as i64
            && max_row <= i32::MAX as i64
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.col, self.row)
    }
}

/// Half-open rectangle of tiles: `[min_col, max_col) x [min_row, max_row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    /// Inclusive minimum column
    pub min_col: i32,
    /// Inclusive minimum row
    pub min_row: i32,
    /// Exclusive maximum column
    pub max_col: i32,
    /// Exclusive maximum row
    pub max_row: i32,
}

impl TileRect {
    /// Creates a new rectangle. Inverted bounds produce an empty rectangle.
    #[must_use]
    pub const fn new(min_col: i32, min_row: i32, max_col: i32, max_row: i32) -> Self {
        Self {
            min_col,
            min_row,
            max_col,
            max_row,
        }
    }

    /// Number of columns covered.
    #[must_use]
    pub const fn width(&self) -> usize {
        if self.max_col > self.min_col {
            (self.max_col - self.min_col) as usize
        } else {
            0
        }
    }

    /// Number of rows covered.
    #[must_use]
    pub const fn height(&self) -> usize {
        if self.max_row > self.min_row {
            (self.max_row - self.min_row) as usize
        } else {
            0
        }
    }

    /// Number of tiles covered.
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Returns true if the rectangle covers no tiles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Checks whether a tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.col >= self.min_col
            && tile.col < self.max_col
            && tile.row >= self.min_row
            && tile.row < self.max_row
    }

    /// Grows the rectangle by `margin` tiles on every side, clipped to the
    /// tile plane.
    #[must_use]
    pub const fn expand(&self, margin: u32) -> Self {
        let m = margin as i64;
        Self::new(
            clamp_to_i32(self.min_col as i64 - m),
            clamp_to_i32(self.min_row as i64 - m),
            clamp_to_i32(self.max_col as i64 + m),
            clamp_to_i32(self.max_row as i64 + m),
        )
    }

    /// Row-major linear index of a tile, or `None` when outside.
    #[must_use]
    pub const fn index_of(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let local_col = (tile.col - self.min_col) as usize;
        let local_row = (tile.row - self.min_row) as usize;
        Some(local_row * self.width() + local_col)
    }

    /// Tile at a row-major linear index.
    #[must_use]
    pub const fn tile_at(&self, index: usize) -> TileCoord {
        let width = self.width();
        TileCoord {
            col: self.min_col + (index % width) as i32,
            row: self.min_row + (index / width) as i32,
        }
    }

    /// Iterates all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let (min_col, max_col) = (self.min_col, self.max_col);
        (self.min_row..self.max_row)
            .flat_map(move |row| (min_col..max_col).map(move |col| TileCoord::new(col, row)))
    }
}

/// Clamps a widened coordinate back into the tile plane.
const fn clamp_to_i32(value: i64) -> i32 {
    if value > i32::MAX as i64 {
        i32::MAX
    } else if value < i32::MIN as i64 {
        i32::MIN
    } else {
        value as i32
    }
}
