//! Timestamp-based staleness decisions.
//!
//! Both build phases go through this module: a product is stale when it is
//! absent (mtime equals the epoch sentinel) or when any of its dependencies
//! is strictly newer. A refreshed product is stamped with `stamp_for`, which
//! never goes below its newest dependency.
use log::warn;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Sentinel modification time of an absent file.
pub const EPOCH_ZERO: SystemTime = SystemTime::UNIX_EPOCH;

/// Modification time of `path`, or `EPOCH_ZERO` if it does not exist.
///
/// Other stat failures are logged and treated as absence, so the product is
/// rebuilt and the real error surfaces when it is written.
pub fn get_mtime(path: &Path) -> SystemTime {
    match path.metadata().and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => EPOCH_ZERO,
        Err(e) => {
            warn!("stat {} failed ({e}); treating as absent", path.display());
            EPOCH_ZERO
        }
    }
}

/// True iff `product` is absent or older than at least one dependency.
pub fn is_stale(dependencies: &[SystemTime], product: SystemTime) -> bool {
    product == EPOCH_ZERO || dependencies.iter().any(|&dep| dep > product)
}

/// Timestamp for a product refreshed at `now`: `max(now, newest dependency)`.
pub fn stamp_for(dependencies: &[SystemTime], now: SystemTime) -> SystemTime {
    dependencies.iter().copied().fold(now, SystemTime::max)
}
