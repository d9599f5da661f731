//! Index of parcel files present in the input directory.
//!
//! The directory is scanned once per build. Files that do not follow the
//! `tile-<ROW><COL>.png` convention, or that name a slot outside the grid, are
//! skipped with a warning. When two names resolve to the same slot (e.g.
//! `tile-a1.png` and `tile-A1.png`) the first in sorted order wins.
use crate::error::BuildError;
use crate::grid::labels::parse_parcel_file_name;
use crate::grid::GridGeometry;
use crate::types::GridCoordinate;
use log::{debug, warn};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default)]
pub struct ParcelIndex {
    parcels: BTreeMap<GridCoordinate, PathBuf>,
}

impl ParcelIndex {
    pub fn scan(dir: &Path, geometry: &GridGeometry) -> Result<Self, BuildError> {
        let read_err = |source| BuildError::ParcelsDir {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = fs::read_dir(dir)
            .map_err(read_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_err)?;
        paths.sort();

        let mut parcels = BTreeMap::new();
        for path in paths {
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!("skipping non UTF-8 file name {}", path.display());
                continue;
            };
            let Some(grid) = parse_parcel_file_name(name) else {
                if name.to_ascii_lowercase().ends_with(".png") {
                    warn!("skipping unrecognized parcel file name: {name}");
                } else {
                    debug!("ignoring {name}");
                }
                continue;
            };
            if !geometry.contains(grid) {
                warn!(
                    "skipping {name}: slot {grid} is outside the {n}x{n} grid",
                    n = geometry.grid_size()
                );
                continue;
            }
            match parcels.entry(grid) {
                Entry::Vacant(slot) => {
                    debug!("parcel {name} -> {grid}");
                    slot.insert(path);
                }
                Entry::Occupied(existing) => warn!(
                    "skipping {name}: slot {grid} already provided by {}",
                    existing.get().display()
                ),
            }
        }
        Ok(Self { parcels })
    }

    pub fn get(&self, grid: GridCoordinate) -> Option<&Path> {
        self.parcels.get(&grid).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GridCoordinate, &Path)> {
        self.parcels.iter().map(|(g, p)| (*g, p.as_path()))
    }
}
