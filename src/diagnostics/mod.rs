//! Build reports: per-phase counters, failing coordinates and timings.
//!
//! `BuildSummary` is returned by the orchestrator and serialises to the JSON
//! summary written by the CLI.

pub mod phase;
pub mod summary;
pub mod timing;

pub use phase::{FailureKind, PhaseReport, TileFailure, TileOutcome};
pub use summary::{BuildSummary, LayerReport};
pub use timing::{elapsed_ms, BuildTiming, StageTiming};
