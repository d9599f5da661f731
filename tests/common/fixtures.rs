use image::{Rgba, RgbaImage};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tile_pyramid::exec::ParallelOptions;
use tile_pyramid::{GridGeometry, PyramidParams};

pub const TILE: u32 = 4;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn params(grid_size: u32, max_zoom: u32) -> PyramidParams {
    PyramidParams {
        geometry: GridGeometry::new(grid_size, max_zoom).expect("valid test geometry"),
        tile_size: TILE,
        parallel: ParallelOptions::disabled(),
        ..Default::default()
    }
}

/// Writes a parcel with a 2-colour diagonal pattern so composites are not flat.
pub fn write_parcel(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
    let [r, g, b] = color;
    let img = RgbaImage::from_fn(TILE, TILE, |x, y| {
        if x >= y {
            Rgba([r, g, b, 255])
        } else {
            Rgba([255 - r, 255 - g, 255 - b, 255])
        }
    });
    let path = dir.join(name);
    img.save(&path).expect("save parcel");
    path
}

pub fn set_mtime(path: &Path, when: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .expect("open for mtime")
        .set_modified(when)
        .expect("set mtime");
}

pub fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).and_then(|m| m.modified()).expect("mtime")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileState {
    pub bytes: Vec<u8>,
    pub mtime: SystemTime,
}

/// Every file under `root`, keyed by its path relative to `root`.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, FileState> {
    let mut out = BTreeMap::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(root).expect("under root").to_path_buf();
                let state = FileState {
                    bytes: fs::read(&path).expect("read file"),
                    mtime: mtime(&path),
                };
                out.insert(rel, state);
            }
        }
    }
    out
}

pub fn contents(snapshot: &BTreeMap<PathBuf, FileState>) -> BTreeMap<PathBuf, Vec<u8>> {
    snapshot
        .iter()
        .map(|(p, s)| (p.clone(), s.bytes.clone()))
        .collect()
}

/// Number of files at one zoom level of a tile tree.
pub fn count_level_files(root: &Path, zoom: u32) -> usize {
    let prefix = PathBuf::from(zoom.to_string());
    snapshot(root)
        .keys()
        .filter(|p| p.starts_with(&prefix))
        .count()
}
