//! Leaf level (zoom = Zmax): one tile per grid slot.
//!
//! Mapped slots with a parcel file get a copy of the parcel's pixels whenever
//! the parcel is newer than the tile. Every other leaf tile (unmapped, or no
//! parcel yet) gets a transparent placeholder once, so the viewer never sees
//! a 404 for a coordinate that is populated later. An existing placeholder has
//! no dependencies and is therefore never stale on its own.
use crate::diagnostics::{elapsed_ms, PhaseReport, TileFailure, TileOutcome};
use crate::error::TileError;
use crate::exec::map_tiles;
use crate::grid::labels::parcel_label;
use crate::image::{fit_to_tile, load_rgba_image, placeholder_tile, snap_monochrome};
use crate::params::PyramidParams;
use crate::parcels::ParcelIndex;
use crate::staleness::{get_mtime, is_stale, stamp_for, EPOCH_ZERO};
use crate::store::TileStore;
use crate::types::TileCoordinate;
use log::{debug, info, warn};
use std::path::Path;
use std::time::{Instant, SystemTime};

pub struct LeafTileSynthesizer<'a> {
    store: &'a TileStore,
    params: &'a PyramidParams,
    parcels: &'a ParcelIndex,
}

impl<'a> LeafTileSynthesizer<'a> {
    pub fn new(store: &'a TileStore, params: &'a PyramidParams, parcels: &'a ParcelIndex) -> Self {
        Self {
            store,
            params,
            parcels,
        }
    }

    /// Refresh every leaf tile in raster order.
    pub fn run(&self) -> PhaseReport {
        let start = Instant::now();
        let zoom = self.params.geometry.max_zoom();
        let tiles: Vec<_> = TileCoordinate::level(zoom).collect();
        let outcomes = map_tiles(tiles, self.params.parallel, |tile| {
            self.refresh_tile(tile).unwrap_or_else(|err| {
                warn!("leaf tile {tile}: {err}");
                TileOutcome::Failed(TileFailure::new(tile, &err))
            })
        });
        let mut report = PhaseReport::from_outcomes(zoom, outcomes);
        report.elapsed_ms = elapsed_ms(start);
        info!(
            "leaf level {zoom}: rebuilt {}, up-to-date {}, placeholders {}, failed {} ({:.1} ms)",
            report.rebuilt,
            report.up_to_date,
            report.placeholders_created,
            report.failed,
            report.elapsed_ms
        );
        report
    }

    pub fn refresh_tile(&self, tile: TileCoordinate) -> Result<TileOutcome, TileError> {
        self.refresh_tile_at(tile, SystemTime::now())
    }

    /// `now` must be read before the parcel is: a parcel replaced while this
    /// tile is being built then stays newer than the tile.
    fn refresh_tile_at(&self, tile: TileCoordinate, now: SystemTime) -> Result<TileOutcome, TileError> {
        let tile_mtime = self.store.mtime(tile);
        let parcel = self
            .params
            .geometry
            .resolve(tile)
            .and_then(|grid| self.parcels.get(grid).map(|path| (grid, path)))
            .map(|(grid, path)| (grid, path, get_mtime(path)))
            // A parcel removed since the scan counts as absent.
            .filter(|&(_, _, mtime)| mtime != EPOCH_ZERO);

        let Some((grid, path, parcel_mtime)) = parcel else {
            if !is_stale(&[], tile_mtime) {
                return Ok(TileOutcome::UpToDate);
            }
            let placeholder = placeholder_tile(self.params.tile_size);
            self.store.write(tile, &placeholder, now)?;
            debug!("leaf tile {tile}: placeholder created");
            return Ok(TileOutcome::PlaceholderCreated);
        };

        if !is_stale(&[parcel_mtime], tile_mtime) {
            debug!("leaf tile {tile} up to date");
            return Ok(TileOutcome::UpToDate);
        }
        let label = parcel_label(grid);
        let pixels = self.load_parcel(path, &label)?;
        let stamp = stamp_for(&[parcel_mtime], now);
        self.store.write(tile, &pixels, stamp)?;
        debug!("leaf tile {tile}: rebuilt from parcel {label}");
        Ok(TileOutcome::Rebuilt)
    }

    fn load_parcel(&self, path: &Path, label: &str) -> Result<image::RgbaImage, TileError> {
        let decoded = load_rgba_image(path)?;
        let mut pixels = fit_to_tile(decoded, self.params.tile_size, label);
        if self.params.snap_monochrome {
            snap_monochrome(&mut pixels);
        }
        Ok(pixels)
    }
}
