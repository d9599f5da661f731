#![doc = include_str!("../README.md")]

// Core build engine.
pub mod builder;
pub mod grid;
pub mod leaf;
pub mod overlay;
pub mod pyramid;
pub mod staleness;

// Supporting pieces: coordinates, parameters, storage and reporting.
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod exec;
pub mod image;
pub mod params;
pub mod parcels;
pub mod store;
pub mod types;

// --- High-level re-exports -------------------------------------------------

pub use crate::builder::{build, BuildMode, BuildOrchestrator};
pub use crate::diagnostics::{BuildSummary, FailureKind, LayerReport, PhaseReport, TileFailure};
pub use crate::error::{BuildError, TileError};
pub use crate::grid::GridGeometry;
pub use crate::overlay::LabelParams;
pub use crate::params::PyramidParams;
pub use crate::store::Layer;
pub use crate::types::{GridCoordinate, TileCoordinate};

/// Small prelude for embedding the builder.
pub mod prelude {
    pub use crate::exec::ParallelOptions;
    pub use crate::pyramid::DownsampleFilter;
    pub use crate::{build, BuildMode, BuildSummary, GridGeometry, LabelParams, Layer, PyramidParams};
}
