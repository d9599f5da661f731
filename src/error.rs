//! Error types for the build engine.
//!
//! `TileError` covers a single coordinate and never aborts a phase; the
//! affected tile is reported and the rest of the level is still processed.
//! `BuildError` is fatal and stops the build before any tile work starts.
use crate::diagnostics::FailureKind;
use crate::types::TileCoordinate;
use std::io;
use std::path::PathBuf;

/// Per-tile failure raised while synthesising or aggregating a tile.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    /// A parcel or child tile could not be read or decoded.
    #[error("failed to read {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A child tile decoded fine but does not have the expected pixel size.
    #[error("{} is {width}x{height}, expected {expected}x{expected}", .path.display())]
    UnexpectedSize {
        path: PathBuf,
        width: u32,
        height: u32,
        expected: u32,
    },

    /// The tile could not be encoded, written or renamed into place.
    #[error("failed to write {}: {source}", .path.display())]
    TileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An interior tile found one of its children missing.
    #[error("tile {tile} is missing child {missing}; the level below did not complete")]
    InvariantViolation {
        tile: TileCoordinate,
        missing: TileCoordinate,
    },
}

impl TileError {
    pub fn source_read(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::SourceRead {
            path: path.into(),
            source,
        }
    }

    pub fn tile_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::TileWrite {
            path: path.into(),
            source,
        }
    }

    /// Category used in reports.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::SourceRead { .. } | Self::UnexpectedSize { .. } => FailureKind::SourceRead,
            Self::TileWrite { .. } => FailureKind::TileWrite,
            Self::InvariantViolation { .. } => FailureKind::InvariantViolation,
        }
    }
}

/// Fatal errors that prevent a build from starting.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid pyramid parameters: {0}")]
    InvalidParams(String),

    #[error("cannot read parcels directory {}: {source}", .path.display())]
    ParcelsDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot prepare output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot load label font {}: {message}", .path.display())]
    LabelFont { path: PathBuf, message: String },
}
