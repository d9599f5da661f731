use crate::error::TileError;
use crate::types::TileCoordinate;
use serde::{Deserialize, Serialize};

/// Report category of a per-tile failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    SourceRead,
    TileWrite,
    InvariantViolation,
}

/// One tile that could not be brought up to date.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileFailure {
    pub tile: TileCoordinate,
    pub kind: FailureKind,
    pub message: String,
}

impl TileFailure {
    pub fn new(tile: TileCoordinate, err: &TileError) -> Self {
        Self {
            tile,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// What happened to a single tile during a phase.
#[derive(Clone, Debug)]
pub enum TileOutcome {
    Rebuilt,
    UpToDate,
    PlaceholderCreated,
    Failed(TileFailure),
}

/// Counters for the leaf phase or one interior level.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseReport {
    pub zoom: u32,
    pub rebuilt: usize,
    pub up_to_date: usize,
    pub placeholders_created: usize,
    pub failed: usize,
    pub failures: Vec<TileFailure>,
    pub elapsed_ms: f64,
}

impl PhaseReport {
    pub fn new(zoom: u32) -> Self {
        Self {
            zoom,
            ..Default::default()
        }
    }

    /// Fold outcomes in the order given; callers pass raster order.
    pub fn from_outcomes(zoom: u32, outcomes: impl IntoIterator<Item = TileOutcome>) -> Self {
        let mut report = Self::new(zoom);
        for outcome in outcomes {
            report.record(outcome);
        }
        report
    }

    pub fn record(&mut self, outcome: TileOutcome) {
        match outcome {
            TileOutcome::Rebuilt => self.rebuilt += 1,
            TileOutcome::UpToDate => self.up_to_date += 1,
            TileOutcome::PlaceholderCreated => self.placeholders_created += 1,
            TileOutcome::Failed(failure) => {
                self.failed += 1;
                self.failures.push(failure);
            }
        }
    }

    /// Tiles written during the phase, placeholders included.
    pub fn written(&self) -> usize {
        self.rebuilt + self.placeholders_created
    }

    pub fn total(&self) -> usize {
        self.written() + self.up_to_date + self.failed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}
