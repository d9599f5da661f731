//! Per-level work distribution.
//!
//! Tiles of one level are independent of each other, so a level may be
//! processed on Rayon's pool. Outcomes are always returned in input order,
//! which keeps reports identical between sequential and parallel runs.
use crate::diagnostics::TileOutcome;
use crate::types::TileCoordinate;
use serde::{Deserialize, Serialize};

/// Controls whether a level runs sequentially or with Rayon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelOptions {
    pub enabled: bool,
    pub min_tiles_for_parallel: usize,
}

impl ParallelOptions {
    pub fn new(enabled: bool, min_tiles_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_tiles_for_parallel: min_tiles_for_parallel.max(1),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_tiles_for_parallel: usize::MAX,
        }
    }

    /// Returns true when a level of `tile_count` tiles should use the pool.
    pub fn should_parallelize(&self, tile_count: usize) -> bool {
        cfg!(feature = "parallel") && self.enabled && tile_count >= self.min_tiles_for_parallel
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_tiles_for_parallel: 16,
        }
    }
}

/// Apply `f` to every tile, returning outcomes in the order of `tiles`.
pub fn map_tiles<F>(tiles: Vec<TileCoordinate>, parallel: ParallelOptions, f: F) -> Vec<TileOutcome>
where
    F: Fn(TileCoordinate) -> TileOutcome + Sync + Send,
{
    if parallel.should_parallelize(tiles.len()) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            return tiles.into_par_iter().map(f).collect();
        }
    }
    tiles.into_iter().map(f).collect()
}
