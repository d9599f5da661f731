//! Label layer: a second pyramid drawn over the parcel artwork.
//!
//! Each leaf tile near the centre of the grid carries a half-transparent
//! green border and the parcel name (`A1`, `AL38`, …) in red. Slots farther
//! than `max_distance` from the grid centre, and leaf tiles outside the grid,
//! get transparent placeholders so the tree stays complete. Interior levels
//! are aggregated exactly like the image layer.
//!
//! A label tile depends only on the font file, if one is configured: it is
//! drawn when absent and redrawn when the font is newer.
use crate::diagnostics::{elapsed_ms, PhaseReport, TileFailure, TileOutcome};
use crate::error::{BuildError, TileError};
use crate::exec::map_tiles;
use crate::grid::labels::parcel_label;
use crate::grid::GridGeometry;
use crate::image::placeholder_tile;
use crate::params::PyramidParams;
use crate::staleness::{get_mtime, is_stale, stamp_for};
use crate::store::TileStore;
use crate::types::{GridCoordinate, TileCoordinate};
use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};

/// Euclidean distance (in slots) from the grid centre beyond which no label
/// is drawn.
pub const LABEL_MAX_DISTANCE: f64 = 19.0;
pub const GRID_LINE_COLOR: Rgba<u8> = Rgba([19, 211, 61, 128]);
pub const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
/// Text height relative to the tile edge.
const TEXT_SCALE: f32 = 0.5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelParams {
    pub enabled: bool,
    /// TrueType/OpenType font for the parcel names. Without one only the
    /// grid border is drawn.
    pub font: Option<PathBuf>,
    pub max_distance: f64,
}

impl Default for LabelParams {
    fn default() -> Self {
        Self {
            enabled: true,
            font: None,
            max_distance: LABEL_MAX_DISTANCE,
        }
    }
}

/// A parsed font together with the mtime label tiles are checked against.
pub struct LabelFont {
    path: PathBuf,
    face: FontVec,
    mtime: SystemTime,
}

impl LabelFont {
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let fail = |message: String| BuildError::LabelFont {
            path: path.to_path_buf(),
            message,
        };
        let bytes = fs::read(path).map_err(|e| fail(e.to_string()))?;
        let face = FontVec::try_from_vec(bytes).map_err(|e| fail(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            face,
            mtime: get_mtime(path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn face(&self) -> &FontVec {
        &self.face
    }

    pub fn mtime(&self) -> SystemTime {
        self.mtime
    }
}

/// Whether `grid` lies within `max_distance` slots of the grid centre.
pub fn within_label_radius(geometry: &GridGeometry, grid: GridCoordinate, max_distance: f64) -> bool {
    let centre = f64::from(geometry.grid_size() - 1) / 2.0;
    let dr = f64::from(grid.row) - centre;
    let dc = f64::from(grid.col) - centre;
    dr.hypot(dc) <= max_distance
}

/// Transparent tile with a 1px grid border and, given a font, `label`
/// centred in red.
pub fn render_label_tile(label: &str, tile_size: u32, font: Option<&FontVec>) -> RgbaImage {
    let mut tile = placeholder_tile(tile_size);
    draw_hollow_rect_mut(
        &mut tile,
        Rect::at(0, 0).of_size(tile_size, tile_size),
        GRID_LINE_COLOR,
    );
    if let Some(font) = font {
        let scale = PxScale::from(tile_size as f32 * TEXT_SCALE);
        let (w, h) = text_size(scale, font, label);
        let x = (i64::from(tile_size) - i64::from(w)) / 2;
        let y = (i64::from(tile_size) - i64::from(h)) / 2;
        draw_text_mut(&mut tile, LABEL_TEXT_COLOR, x as i32, y as i32, scale, font, label);
    }
    tile
}

pub struct LabelTileSynthesizer<'a> {
    store: &'a TileStore,
    params: &'a PyramidParams,
    font: Option<&'a LabelFont>,
}

impl<'a> LabelTileSynthesizer<'a> {
    pub fn new(store: &'a TileStore, params: &'a PyramidParams, font: Option<&'a LabelFont>) -> Self {
        Self {
            store,
            params,
            font,
        }
    }

    pub fn run(&self) -> PhaseReport {
        let start = Instant::now();
        let zoom = self.params.geometry.max_zoom();
        let tiles: Vec<_> = TileCoordinate::level(zoom).collect();
        let outcomes = map_tiles(tiles, self.params.parallel, |tile| {
            self.refresh_tile(tile).unwrap_or_else(|err| {
                warn!("label tile {tile}: {err}");
                TileOutcome::Failed(TileFailure::new(tile, &err))
            })
        });
        let mut report = PhaseReport::from_outcomes(zoom, outcomes);
        report.elapsed_ms = elapsed_ms(start);
        info!(
            "label level {zoom}: drawn {}, up-to-date {}, placeholders {}, failed {} ({:.1} ms)",
            report.rebuilt,
            report.up_to_date,
            report.placeholders_created,
            report.failed,
            report.elapsed_ms
        );
        report
    }

    pub fn refresh_tile(&self, tile: TileCoordinate) -> Result<TileOutcome, TileError> {
        let now = SystemTime::now();
        let tile_mtime = self.store.mtime(tile);
        let labels = &self.params.labels;
        let geometry = &self.params.geometry;
        let slot = geometry
            .resolve(tile)
            .filter(|&grid| within_label_radius(geometry, grid, labels.max_distance));

        let Some(grid) = slot else {
            if !is_stale(&[], tile_mtime) {
                return Ok(TileOutcome::UpToDate);
            }
            self.store
                .write(tile, &placeholder_tile(self.params.tile_size), now)?;
            return Ok(TileOutcome::PlaceholderCreated);
        };

        let dependencies: Vec<SystemTime> = self.font.map(LabelFont::mtime).into_iter().collect();
        if !is_stale(&dependencies, tile_mtime) {
            return Ok(TileOutcome::UpToDate);
        }
        let label = parcel_label(grid);
        let pixels = render_label_tile(&label, self.params.tile_size, self.font.map(LabelFont::face));
        self.store
            .write(tile, &pixels, stamp_for(&dependencies, now))?;
        debug!("label tile {tile}: drew {label}");
        Ok(TileOutcome::Rebuilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::ParallelOptions;
    use std::time::Duration;

    const SYSTEM_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

    fn params() -> PyramidParams {
        PyramidParams {
            // 3x3 grid centred in 4x4: column 3 and row y=3 are outside it.
            geometry: GridGeometry::new(3, 2).unwrap(),
            tile_size: 8,
            parallel: ParallelOptions::disabled(),
            ..Default::default()
        }
    }

    #[test]
    fn product_radius_drops_the_corners() {
        let geometry = GridGeometry::default();
        let labelled = geometry
            .slots()
            .filter(|&g| within_label_radius(&geometry, g, LABEL_MAX_DISTANCE))
            .count();
        assert_eq!(labelled, 1124);
        // Bottom row: A16 is just inside, A15 just outside.
        assert!(within_label_radius(&geometry, GridCoordinate::new(0, 15), LABEL_MAX_DISTANCE));
        assert!(!within_label_radius(&geometry, GridCoordinate::new(0, 14), LABEL_MAX_DISTANCE));
        assert!(within_label_radius(&geometry, GridCoordinate::new(18, 18), 0.8));
    }

    #[test]
    fn border_only_tile_without_font() {
        let tile = render_label_tile("B2", 6, None);
        assert_eq!(tile.get_pixel(0, 0).0, GRID_LINE_COLOR.0);
        assert_eq!(tile.get_pixel(5, 2).0, GRID_LINE_COLOR.0);
        assert_eq!(tile.get_pixel(3, 5).0, GRID_LINE_COLOR.0);
        assert_eq!(tile.get_pixel(2, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn text_is_drawn_in_red_inside_the_border() {
        let Ok(font) = LabelFont::load(Path::new(SYSTEM_FONT)) else {
            eprintln!("skipping: {SYSTEM_FONT} not available");
            return;
        };
        let tile = render_label_tile("H4", 64, Some(font.face()));
        assert_eq!(tile.get_pixel(0, 0).0, GRID_LINE_COLOR.0);
        let red = tile
            .enumerate_pixels()
            .filter(|(x, y, p)| (1..63).contains(x) && (1..63).contains(y) && p.0[3] > 0)
            .inspect(|(_, _, p)| assert_eq!((p.0[1], p.0[2]), (0, 0)))
            .count();
        assert!(red > 0);
    }

    #[test]
    fn invalid_font_is_a_build_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        fs::write(&path, b"not a font").unwrap();
        assert!(matches!(LabelFont::load(&path), Err(BuildError::LabelFont { .. })));
        assert!(matches!(
            LabelFont::load(&dir.path().join("missing.ttf")),
            Err(BuildError::LabelFont { .. })
        ));
    }

    #[test]
    fn labels_cover_grid_slots_and_pad_the_rest() {
        let out = tempfile::tempdir().unwrap();
        let params = params();
        let store = TileStore::new(out.path());

        let report = LabelTileSynthesizer::new(&store, &params, None).run();
        assert_eq!((report.rebuilt, report.placeholders_created, report.failed), (9, 7, 0));
        let inside = params.geometry.encode(GridCoordinate::new(1, 1)).unwrap();
        assert_eq!(store.read(inside).unwrap().get_pixel(0, 0).0, GRID_LINE_COLOR.0);
        let outside = TileCoordinate::new(2, 3, 3);
        assert!(store.read(outside).unwrap().pixels().all(|p| p.0[3] == 0));

        let again = LabelTileSynthesizer::new(&store, &params, None).run();
        assert_eq!((again.up_to_date, again.written()), (16, 0));
    }

    #[test]
    fn slots_beyond_the_radius_stay_blank() {
        let out = tempfile::tempdir().unwrap();
        let params = PyramidParams {
            labels: LabelParams {
                max_distance: 0.5,
                ..Default::default()
            },
            ..params()
        };
        let store = TileStore::new(out.path());
        let report = LabelTileSynthesizer::new(&store, &params, None).run();
        // Only the centre slot of the 3x3 grid is within half a slot.
        assert_eq!((report.rebuilt, report.placeholders_created), (1, 15));
    }

    #[test]
    fn newer_font_redraws_labels() {
        let Ok(font) = LabelFont::load(Path::new(SYSTEM_FONT)) else {
            eprintln!("skipping: {SYSTEM_FONT} not available");
            return;
        };
        let out = tempfile::tempdir().unwrap();
        let params = params();
        let store = TileStore::new(out.path());
        let tile = params.geometry.encode(GridCoordinate::new(0, 0)).unwrap();
        let synth = LabelTileSynthesizer::new(&store, &params, Some(&font));
        assert!(matches!(synth.refresh_tile(tile).unwrap(), TileOutcome::Rebuilt));
        assert!(store.mtime(tile) >= font.mtime());
        assert!(matches!(synth.refresh_tile(tile).unwrap(), TileOutcome::UpToDate));

        let updated = LabelFont {
            mtime: store.mtime(tile) + Duration::from_secs(5),
            ..font
        };
        let synth = LabelTileSynthesizer::new(&store, &params, Some(&updated));
        assert!(matches!(synth.refresh_tile(tile).unwrap(), TileOutcome::Rebuilt));
        assert_eq!(store.mtime(tile), updated.mtime());
    }
}
