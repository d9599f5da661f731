use serde::{Deserialize, Serialize};
use std::time::Instant;

/// How long one step of a build took, e.g. `images level 6` or `wipe`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub stage: String,
    pub elapsed_ms: f64,
}

/// Per-step wall-clock times of a build, in execution order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTiming {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl BuildTiming {
    pub fn record(&mut self, stage: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            stage: stage.into(),
            elapsed_ms,
        });
    }

    /// The slowest step, if any ran.
    pub fn slowest(&self) -> Option<&StageTiming> {
        self.stages
            .iter()
            .max_by(|a, b| a.elapsed_ms.total_cmp(&b.elapsed_ms))
    }
}

pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
