//! Parameters shared by both build phases.
//!
//! Defaults reproduce the product world: a 38×38 parcel grid at zoom 6 with
//! 500×500 pixel tiles, monochrome parcels, box-filtered interior levels,
//! durable writes, a label layer and per-level parallelism when the
//! `parallel` feature is enabled.

use crate::error::BuildError;
use crate::exec::ParallelOptions;
use crate::grid::GridGeometry;
use crate::overlay::LabelParams;
use crate::pyramid::DownsampleFilter;

/// Knobs for the leaf synthesizer and the pyramid aggregator.
#[derive(Clone, Debug)]
pub struct PyramidParams {
    /// Grid size and leaf zoom level.
    pub geometry: GridGeometry,
    /// Edge length of every tile in pixels.
    pub tile_size: u32,
    /// Reduction filter for interior levels.
    pub downsample: DownsampleFilter,
    /// Snap parcel pixels to black/white before they become leaf tiles.
    pub snap_monochrome: bool,
    /// `fsync` each tile before renaming it into place, and every level's
    /// directories before the next level reads them.
    pub sync_writes: bool,
    /// Per-level work distribution.
    pub parallel: ParallelOptions,
    /// Grid-line and parcel-name layer.
    pub labels: LabelParams,
}

impl PyramidParams {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.tile_size == 0 {
            return Err(BuildError::InvalidParams("tile_size must be positive".into()));
        }
        // Re-run the geometry checks; the fields may come from deserialised input.
        GridGeometry::new(self.geometry.grid_size(), self.geometry.max_zoom())?;
        let radius = self.labels.max_distance;
        if radius.is_nan() || radius < 0.0 {
            return Err(BuildError::InvalidParams(
                "labels.max_distance must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PyramidParams {
    fn default() -> Self {
        Self {
            geometry: GridGeometry::default(),
            tile_size: 500,
            downsample: DownsampleFilter::default(),
            snap_monochrome: true,
            sync_writes: true,
            parallel: ParallelOptions::default(),
            labels: LabelParams::default(),
        }
    }
}
