use super::phase::{PhaseReport, TileFailure};
use super::timing::BuildTiming;
use crate::builder::BuildMode;
use crate::store::Layer;
use serde::{Deserialize, Serialize};

/// Leaf phase and interior levels of one pyramid.
///
/// `levels` is ordered the way the levels were built: `Zmax-1` first, `0` last.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerReport {
    pub layer: Layer,
    pub leaf: PhaseReport,
    pub levels: Vec<PhaseReport>,
}

impl LayerReport {
    /// Leaf phase followed by each interior level, in build order.
    pub fn phases(&self) -> impl Iterator<Item = &PhaseReport> {
        std::iter::once(&self.leaf).chain(self.levels.iter())
    }

    pub fn level(&self, zoom: u32) -> Option<&PhaseReport> {
        self.phases().find(|p| p.zoom == zoom)
    }

    pub fn is_success(&self) -> bool {
        self.phases().all(PhaseReport::is_success)
    }
}

/// Result of one build invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub mode: BuildMode,
    pub parcels_found: usize,
    pub images: LayerReport,
    /// `None` when the label layer is disabled.
    pub labels: Option<LayerReport>,
    pub timing: BuildTiming,
}

impl BuildSummary {
    pub fn layers(&self) -> impl Iterator<Item = &LayerReport> {
        std::iter::once(&self.images).chain(self.labels.as_ref())
    }

    /// Every phase of every layer, images first.
    pub fn phases(&self) -> impl Iterator<Item = &PhaseReport> {
        self.layers().flat_map(LayerReport::phases)
    }

    pub fn failures(&self) -> impl Iterator<Item = &TileFailure> {
        self.phases().flat_map(|p| p.failures.iter())
    }

    pub fn total_rebuilt(&self) -> usize {
        self.phases().map(|p| p.rebuilt).sum()
    }

    pub fn total_written(&self) -> usize {
        self.phases().map(PhaseReport::written).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.phases().map(|p| p.failed).sum()
    }

    /// True when no tile failed in any layer.
    pub fn is_success(&self) -> bool {
        self.layers().all(LayerReport::is_success)
    }
}
