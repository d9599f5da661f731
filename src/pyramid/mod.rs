//! Interior pyramid levels built from their four children.
//!
//! Levels run strictly one at a time, from `Zmax-1` up to 0: a level's tiles
//! are the read-only inputs of the level above, and `run_level` only returns
//! after every write of its level has been renamed into place. Within a level
//! tiles are independent and may be processed in parallel.
//!
//! A tile is refreshed when any child is newer than it (or it is absent). A
//! missing child is not staleness: it means the level below is incomplete,
//! and the tile is reported as an invariant violation and left untouched.

pub mod filters;

use crate::diagnostics::{elapsed_ms, PhaseReport, TileFailure, TileOutcome};
use crate::error::{BuildError, TileError};
use crate::exec::map_tiles;
use crate::image::composite_quad;
use crate::params::PyramidParams;
use crate::staleness::{is_stale, stamp_for, EPOCH_ZERO};
use crate::store::TileStore;
use crate::types::TileCoordinate;
use image::RgbaImage;
use log::{debug, info, warn};
use std::time::{Instant, SystemTime};

pub use filters::DownsampleFilter;

pub struct PyramidAggregator<'a> {
    store: &'a TileStore,
    params: &'a PyramidParams,
}

impl<'a> PyramidAggregator<'a> {
    pub fn new(store: &'a TileStore, params: &'a PyramidParams) -> Self {
        Self { store, params }
    }

    /// Bring every tile of `zoom` up to date with the level below.
    pub fn run_level(&self, zoom: u32) -> Result<PhaseReport, BuildError> {
        let max_zoom = self.params.geometry.max_zoom();
        if zoom >= max_zoom {
            return Err(BuildError::InvalidParams(format!(
                "interior level {zoom} must be below the leaf level {max_zoom}"
            )));
        }
        let start = Instant::now();
        let tiles: Vec<_> = TileCoordinate::level(zoom).collect();
        let outcomes = map_tiles(tiles, self.params.parallel, |tile| {
            self.refresh_tile(tile).unwrap_or_else(|err| {
                warn!("tile {tile}: {err}");
                TileOutcome::Failed(TileFailure::new(tile, &err))
            })
        });
        let mut report = PhaseReport::from_outcomes(zoom, outcomes);
        report.elapsed_ms = elapsed_ms(start);
        info!(
            "level {zoom}: rebuilt {}, up-to-date {}, failed {} ({:.1} ms)",
            report.rebuilt, report.up_to_date, report.failed, report.elapsed_ms
        );
        Ok(report)
    }

    /// Recompute `tile` if any of its children changed since it was written.
    pub fn refresh_tile(&self, tile: TileCoordinate) -> Result<TileOutcome, TileError> {
        let now = SystemTime::now();
        let children = tile.children();
        let mut child_mtimes = [EPOCH_ZERO; 4];
        for (slot, &child) in child_mtimes.iter_mut().zip(children.iter()) {
            *slot = self.store.mtime(child);
            if *slot == EPOCH_ZERO {
                return Err(TileError::InvariantViolation {
                    tile,
                    missing: child,
                });
            }
        }

        if !is_stale(&child_mtimes, self.store.mtime(tile)) {
            debug!("tile {tile} up to date");
            return Ok(TileOutcome::UpToDate);
        }

        let images = children
            .iter()
            .map(|&child| self.read_child(child))
            .collect::<Result<Vec<_>, _>>()?;
        let canvas = composite_quad(&images, self.params.tile_size);
        let reduced = self.params.downsample.reduce(&canvas);
        let stamp = stamp_for(&child_mtimes, now);
        self.store.write(tile, &reduced, stamp)?;
        debug!("tile {tile} rebuilt");
        Ok(TileOutcome::Rebuilt)
    }

    fn read_child(&self, child: TileCoordinate) -> Result<RgbaImage, TileError> {
        let image = self.store.read(child)?;
        let expected = self.params.tile_size;
        if image.dimensions() != (expected, expected) {
            return Err(TileError::UnexpectedSize {
                path: self.store.tile_path(child),
                width: image.width(),
                height: image.height(),
                expected,
            });
        }
        Ok(image)
    }
}
