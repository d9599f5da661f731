//! On-disk tile trees `<output>/<layer>/<zoom>/<x>/<y>.png`.
//!
//! Every write goes to a `.tile-*` temporary file in the destination
//! directory, gets its modification time stamped, and is then renamed over
//! the target. Readers therefore see either the previous tile or the complete
//! new one. Temporaries orphaned by a killed run are swept by `prepare`.
use crate::error::TileError;
use crate::image::{encode_png, load_rgba_image};
use crate::staleness::get_mtime;
use crate::types::TileCoordinate;
use image::RgbaImage;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const TILE_EXTENSION: &str = "png";
/// Name prefix of in-flight tile writes.
pub const TEMP_PREFIX: &str = ".tile-";

/// The two pyramids built side by side under one output directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Parcel artwork.
    Images,
    /// Grid lines and parcel names drawn over the artwork.
    Labels,
}

impl Layer {
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Labels => "labels",
        }
    }

    /// Root of this layer's tile tree inside `output_dir`.
    pub fn root(self, output_dir: &Path) -> PathBuf {
        output_dir.join(self.dir_name())
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Clone, Debug)]
pub struct TileStore {
    root: PathBuf,
    sync_writes: bool,
}

impl TileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sync_writes: false,
        }
    }

    /// `fsync` each tile before it is renamed into place. The orchestrator
    /// also calls `sync_level` once per finished level when this is set.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn zoom_dir(&self, zoom: u32) -> PathBuf {
        self.root.join(zoom.to_string())
    }

    pub fn tile_path(&self, tile: TileCoordinate) -> PathBuf {
        self.zoom_dir(tile.zoom)
            .join(tile.x.to_string())
            .join(format!("{}.{TILE_EXTENSION}", tile.y))
    }

    /// Modification time of a tile, epoch zero when absent.
    pub fn mtime(&self, tile: TileCoordinate) -> SystemTime {
        get_mtime(&self.tile_path(tile))
    }

    pub fn read(&self, tile: TileCoordinate) -> Result<RgbaImage, TileError> {
        load_rgba_image(&self.tile_path(tile))
    }

    /// Atomically replace `tile` with `image` and set its mtime to `stamp`.
    pub fn write(
        &self,
        tile: TileCoordinate,
        image: &RgbaImage,
        stamp: SystemTime,
    ) -> Result<PathBuf, TileError> {
        let path = self.tile_path(tile);
        let bytes = encode_png(image)
            .map_err(|e| TileError::tile_write(&path, io::Error::other(e)))?;
        self.write_bytes(&path, &bytes, stamp)
            .map_err(|e| TileError::tile_write(&path, e))?;
        Ok(path)
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8], stamp: SystemTime) -> io::Result<()> {
        let dir = path
            .parent()
            .ok_or_else(|| io::Error::other("tile path has no parent directory"))?;
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().set_modified(stamp)?;
        if self.sync_writes {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Ensure the root directory exists and drop temporaries left by an
    /// interrupted run. Returns how many were removed.
    pub fn prepare(&self) -> io::Result<usize> {
        fs::create_dir_all(&self.root)?;
        let removed = sweep_temp_files(&self.root)?;
        if removed > 0 {
            warn!(
                "removed {removed} unfinished tile writes under {}",
                self.root.display()
            );
        }
        Ok(removed)
    }

    /// `fsync` the directories of one level so its renames survive a crash.
    /// A level that was never created has nothing to flush.
    pub fn sync_level(&self, zoom: u32) -> io::Result<()> {
        let zoom_dir = self.zoom_dir(zoom);
        if !zoom_dir.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&zoom_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                sync_dir(&entry.path())?;
            }
        }
        sync_dir(&zoom_dir)?;
        sync_dir(&self.root)
    }

    /// Remove the entire tree. A missing root is not an error.
    pub fn wipe(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.root) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn sweep_temp_files(dir: &Path) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            removed += sweep_temp_files(&path)?;
        } else if entry.file_name().to_string_lossy().starts_with(TEMP_PREFIX) {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

// Directory handles cannot be flushed portably elsewhere.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
