//! Build orchestration: for each layer the leaf phase, then every interior
//! level in order. The image and label pyramids live side by side under
//! `<output>/images` and `<output>/labels`.
//!
//! ```no_run
//! use tile_pyramid::{build, BuildMode, PyramidParams};
//! use std::path::Path;
//!
//! let summary = build(
//!     Path::new("parcels"),
//!     Path::new("docs/world"),
//!     BuildMode::Incremental,
//!     &PyramidParams::default(),
//! )?;
//! println!("rebuilt {} tiles", summary.total_rebuilt());
//! # Ok::<(), tile_pyramid::BuildError>(())
//! ```
use crate::diagnostics::{elapsed_ms, BuildSummary, BuildTiming, LayerReport, PhaseReport};
use crate::error::BuildError;
use crate::leaf::LeafTileSynthesizer;
use crate::overlay::{LabelFont, LabelTileSynthesizer};
use crate::params::PyramidParams;
use crate::parcels::ParcelIndex;
use crate::pyramid::PyramidAggregator;
use crate::store::{Layer, TileStore};
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Refresh only stale tiles.
    #[default]
    Incremental,
    /// Delete both tile trees first, then build from scratch.
    Force,
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Incremental => "incremental",
            Self::Force => "force",
        })
    }
}

pub struct BuildOrchestrator {
    parcels_dir: PathBuf,
    output_dir: PathBuf,
    images: TileStore,
    labels: TileStore,
    label_font: Option<LabelFont>,
    params: PyramidParams,
}

impl BuildOrchestrator {
    pub fn new(
        parcels_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        params: PyramidParams,
    ) -> Result<Self, BuildError> {
        params.validate()?;
        let output_dir = output_dir.into();
        let store = |layer: Layer| {
            TileStore::new(layer.root(&output_dir)).with_sync_writes(params.sync_writes)
        };
        let (images, labels) = (store(Layer::Images), store(Layer::Labels));
        let label_font = match (&params.labels.font, params.labels.enabled) {
            (Some(path), true) => Some(LabelFont::load(path)?),
            _ => None,
        };
        Ok(Self {
            parcels_dir: parcels_dir.into(),
            output_dir,
            images,
            labels,
            label_font,
            params,
        })
    }

    pub fn store(&self, layer: Layer) -> &TileStore {
        match layer {
            Layer::Images => &self.images,
            Layer::Labels => &self.labels,
        }
    }

    pub fn params(&self) -> &PyramidParams {
        &self.params
    }

    fn layers(&self) -> Vec<Layer> {
        let mut layers = vec![Layer::Images];
        if self.params.labels.enabled {
            layers.push(Layer::Labels);
        }
        layers
    }

    /// Run one build. Per-tile failures end up in the summary; only setup
    /// problems are returned as errors.
    pub fn run(&self, mode: BuildMode) -> Result<BuildSummary, BuildError> {
        let start = Instant::now();
        let mut timing = BuildTiming::default();
        info!(
            "{mode} build: {} -> {}",
            self.parcels_dir.display(),
            self.output_dir.display()
        );

        // Scan before wiping so a bad input path never costs the existing trees.
        let parcels = ParcelIndex::scan(&self.parcels_dir, &self.params.geometry)?;
        info!("found {} parcel files", parcels.len());

        if mode == BuildMode::Force {
            let wipe_start = Instant::now();
            for layer in [Layer::Images, Layer::Labels] {
                let store = self.store(layer);
                store.wipe().map_err(|source| output_err(store.root(), source))?;
                info!("removed {}", store.root().display());
            }
            timing.record("wipe", elapsed_ms(wipe_start));
        }
        for layer in self.layers() {
            let store = self.store(layer);
            store.prepare().map_err(|source| output_err(store.root(), source))?;
        }

        let images = self.build_layer(Layer::Images, &mut timing, |store| {
            LeafTileSynthesizer::new(store, &self.params, &parcels).run()
        })?;
        let labels = if self.params.labels.enabled {
            let font = self.label_font.as_ref();
            Some(self.build_layer(Layer::Labels, &mut timing, |store| {
                LabelTileSynthesizer::new(store, &self.params, font).run()
            })?)
        } else {
            None
        };
        timing.total_ms = elapsed_ms(start);

        let summary = BuildSummary {
            mode,
            parcels_found: parcels.len(),
            images,
            labels,
            timing,
        };
        info!(
            "{mode} build finished: {} tiles written, {} failed ({:.1} ms)",
            summary.total_written(),
            summary.total_failed(),
            summary.timing.total_ms
        );
        Ok(summary)
    }

    /// Leaf phase through `leaf_phase`, then levels `Zmax-1 ..= 0` with the
    /// shared aggregator.
    fn build_layer(
        &self,
        layer: Layer,
        timing: &mut BuildTiming,
        leaf_phase: impl FnOnce(&TileStore) -> PhaseReport,
    ) -> Result<LayerReport, BuildError> {
        let store = self.store(layer);
        let leaf = leaf_phase(store);
        timing.record(format!("{layer} level {}", leaf.zoom), leaf.elapsed_ms);
        self.flush_level(store, leaf.zoom)?;

        let aggregator = PyramidAggregator::new(store, &self.params);
        let mut levels = Vec::new();
        for zoom in (0..self.params.geometry.max_zoom()).rev() {
            let report = aggregator.run_level(zoom)?;
            timing.record(format!("{layer} level {zoom}"), report.elapsed_ms);
            self.flush_level(store, zoom)?;
            levels.push(report);
        }
        Ok(LayerReport {
            layer,
            leaf,
            levels,
        })
    }

    fn flush_level(&self, store: &TileStore, zoom: u32) -> Result<(), BuildError> {
        if !self.params.sync_writes {
            return Ok(());
        }
        store
            .sync_level(zoom)
            .map_err(|source| output_err(&store.zoom_dir(zoom), source))
    }
}

fn output_err(path: &Path, source: std::io::Error) -> BuildError {
    BuildError::OutputDir {
        path: path.to_path_buf(),
        source,
    }
}

/// One-shot build of `output_dir` from `parcels_dir`.
pub fn build(
    parcels_dir: &Path,
    output_dir: &Path,
    mode: BuildMode,
    params: &PyramidParams,
) -> Result<BuildSummary, BuildError> {
    BuildOrchestrator::new(parcels_dir, output_dir, params.clone())?.run(mode)
}
