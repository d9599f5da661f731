//! Coordinate types shared by the build phases.
//!
//! - `GridCoordinate`: one parcel slot `(row, col)` of the N×N world grid.
//! - `TileCoordinate`: one tile `(zoom, x, y)` of the slippy-map pyramid.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical parcel slot. Row 0 is the bottom row of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub row: u32,
    pub col: u32,
}

impl GridCoordinate {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(row={}, col={})", self.row, self.col)
    }
}

/// Address of one tile in the pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoordinate {
    pub zoom: u32,
    pub x: u32,
    pub y: u32,
}

impl TileCoordinate {
    pub const fn new(zoom: u32, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Number of tiles along one axis at `zoom`.
    #[inline]
    pub fn tiles_per_axis(zoom: u32) -> u32 {
        1u32 << zoom
    }

    /// The four children at `zoom + 1`, in composite order:
    /// top-left, top-right, bottom-left, bottom-right.
    pub fn children(&self) -> [TileCoordinate; 4] {
        let (z, x, y) = (self.zoom + 1, self.x * 2, self.y * 2);
        [
            TileCoordinate::new(z, x, y),
            TileCoordinate::new(z, x + 1, y),
            TileCoordinate::new(z, x, y + 1),
            TileCoordinate::new(z, x + 1, y + 1),
        ]
    }

    /// The tile one level up that this tile contributes to, if any.
    pub fn parent(&self) -> Option<TileCoordinate> {
        (self.zoom > 0).then(|| TileCoordinate::new(self.zoom - 1, self.x / 2, self.y / 2))
    }

    /// Every tile of `zoom` in raster order (row by row, `y` outer).
    pub fn level(zoom: u32) -> impl Iterator<Item = TileCoordinate> {
        let n = Self::tiles_per_axis(zoom);
        (0..n).flat_map(move |y| (0..n).map(move |x| TileCoordinate::new(zoom, x, y)))
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_cover_the_parent_quadrants() {
        let t = TileCoordinate::new(2, 1, 3);
        let kids = t.children();
        assert_eq!(kids[0], TileCoordinate::new(3, 2, 6));
        assert_eq!(kids[1], TileCoordinate::new(3, 3, 6));
        assert_eq!(kids[2], TileCoordinate::new(3, 2, 7));
        assert_eq!(kids[3], TileCoordinate::new(3, 3, 7));
        for kid in kids {
            assert_eq!(kid.parent(), Some(t));
        }
        assert_eq!(TileCoordinate::new(0, 0, 0).parent(), None);
    }

    #[test]
    fn level_enumerates_in_raster_order() {
        let tiles: Vec<_> = TileCoordinate::level(1).collect();
        assert_eq!(
            tiles,
            vec![
                TileCoordinate::new(1, 0, 0),
                TileCoordinate::new(1, 1, 0),
                TileCoordinate::new(1, 0, 1),
                TileCoordinate::new(1, 1, 1),
            ]
        );
        assert_eq!(TileCoordinate::level(6).count(), 64 * 64);
    }
}
