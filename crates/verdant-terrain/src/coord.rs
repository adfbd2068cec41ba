//! Integer chunk coordinates on the infinite XZ tile grid.

use std::fmt;

/// Identifies one terrain tile in the infinite grid.
///
/// `x` runs along world X and `y` along world Z. Equality and hashing are by
/// value; this is the key of the loaded-chunk map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Grid column (world X).
    pub x: i32,
    /// Grid row (world Z).
    pub y: i32,
}

impl ChunkCoord {
    /// Creates a new coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate offset by `(dx, dy)`, saturating at the grid edge.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Chebyshev (chessboard) distance in chunks.
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = (self.x as i64 - other.x as i64).unsigned_abs();
        let dy = (self.y as i64 - other.y as i64).unsigned_abs();
        dx.max(dy).min(u32::MAX as u64) as u32
    }

    /// The chunk containing world position `(x, z)`: floor division by the
    /// chunk's world size on both axes.
    ///
    /// Non-finite positions map to the origin chunk.
    pub fn from_world(x: f64, z: f64, chunk_world_size: f64) -> Self {
        if !(x.is_finite() && z.is_finite()) || chunk_world_size <= 0.0 {
            return Self::default();
        }
        // `as` saturates at the i32 bounds.
        Self {
            x: (x / chunk_world_size).floor() as i32,
            y: (z / chunk_world_size).floor() as i32,
        }
    }

    /// World-space `(x, z)` of the tile's corner vertex.
    pub fn world_origin(self, chunk_world_size: f64) -> (f64, f64) {
        (
            self.x as f64 * chunk_world_size,
            self.y as f64 * chunk_world_size,
        )
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
