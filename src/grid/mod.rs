//! Placement of the parcel grid inside the leaf tile level.
//!
//! The N×N grid is centred in the `2^Zmax × 2^Zmax` leaf space with a fixed
//! offset `(2^Zmax − N) / 2`. Columns grow with `x`; rows grow *upwards*, so
//! row 0 lands on the highest mapped `y`. Leaf tiles outside the placement are
//! unmapped and stay unmapped for a given geometry.
//!
//! `resolve` and `encode` are exact inverses on the mapped region.

pub mod labels;

use crate::error::BuildError;
use crate::types::{GridCoordinate, TileCoordinate};
use serde::{Deserialize, Serialize};

/// Deepest leaf level accepted; `4^20` leaf tiles is already far beyond any
/// sensible on-disk pyramid.
pub const MAX_SUPPORTED_ZOOM: u32 = 20;

/// Size of the parcel grid and depth of the pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridGeometry {
    grid_size: u32,
    max_zoom: u32,
}

impl GridGeometry {
    /// Validate `1 <= grid_size <= 2^max_zoom`.
    pub fn new(grid_size: u32, max_zoom: u32) -> Result<Self, BuildError> {
        if max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(BuildError::InvalidParams(format!(
                "max_zoom {max_zoom} exceeds the supported maximum {MAX_SUPPORTED_ZOOM}"
            )));
        }
        let span = TileCoordinate::tiles_per_axis(max_zoom);
        if grid_size == 0 || grid_size > span {
            return Err(BuildError::InvalidParams(format!(
                "grid_size {grid_size} does not fit a {span}x{span} leaf level (max_zoom {max_zoom})"
            )));
        }
        Ok(Self {
            grid_size,
            max_zoom,
        })
    }

    #[inline]
    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Leaf zoom level (Zmax).
    #[inline]
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Tile offset of grid column 0 / the top grid row.
    #[inline]
    pub fn offset(&self) -> u32 {
        (TileCoordinate::tiles_per_axis(self.max_zoom) - self.grid_size) / 2
    }

    pub fn contains(&self, grid: GridCoordinate) -> bool {
        grid.row < self.grid_size && grid.col < self.grid_size
    }

    /// Map a leaf tile to its parcel slot, `None` when unmapped.
    pub fn resolve(&self, tile: TileCoordinate) -> Option<GridCoordinate> {
        if tile.zoom != self.max_zoom {
            return None;
        }
        let offset = self.offset();
        let col = tile.x.checked_sub(offset)?;
        let from_top = tile.y.checked_sub(offset)?;
        if col >= self.grid_size || from_top >= self.grid_size {
            return None;
        }
        Some(GridCoordinate::new(self.grid_size - 1 - from_top, col))
    }

    /// Leaf tile holding the parcel slot `grid`, `None` outside the grid.
    pub fn encode(&self, grid: GridCoordinate) -> Option<TileCoordinate> {
        if !self.contains(grid) {
            return None;
        }
        let offset = self.offset();
        Some(TileCoordinate::new(
            self.max_zoom,
            grid.col + offset,
            offset + (self.grid_size - 1 - grid.row),
        ))
    }

    /// Every slot of the grid, row-major.
    pub fn slots(&self) -> impl Iterator<Item = GridCoordinate> {
        let n = self.grid_size;
        (0..n).flat_map(move |row| (0..n).map(move |col| GridCoordinate::new(row, col)))
    }
}

impl Default for GridGeometry {
    /// The product world: 38×38 parcels at zoom 6.
    fn default() -> Self {
        Self {
            grid_size: 38,
            max_zoom: 6,
        }
    }
}
