use crate::builder::BuildMode;
use crate::exec::ParallelOptions;
use crate::grid::GridGeometry;
use crate::overlay::LabelParams;
use crate::params::PyramidParams;
use crate::pyramid::DownsampleFilter;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration of the `tile-pyramid` binary. Every key is optional.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub parcels_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: BuildMode,
    pub grid_size: u32,
    pub max_zoom: u32,
    pub tile_size: u32,
    pub downsample: DownsampleFilter,
    pub snap_monochrome: bool,
    pub sync_writes: bool,
    pub parallel: ParallelOptions,
    pub labels: LabelParams,
    /// Where to write the JSON build summary, if anywhere.
    pub summary_json: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        let params = PyramidParams::default();
        Self {
            parcels_dir: PathBuf::from("parcels"),
            output_dir: PathBuf::from("docs/world"),
            mode: BuildMode::Incremental,
            grid_size: params.geometry.grid_size(),
            max_zoom: params.geometry.max_zoom(),
            tile_size: params.tile_size,
            downsample: params.downsample,
            snap_monochrome: params.snap_monochrome,
            sync_writes: params.sync_writes,
            parallel: params.parallel,
            labels: params.labels,
            summary_json: None,
        }
    }
}

impl BuildConfig {
    pub fn pyramid_params(&self) -> Result<PyramidParams, String> {
        let geometry = GridGeometry::new(self.grid_size, self.max_zoom).map_err(|e| e.to_string())?;
        let params = PyramidParams {
            geometry,
            tile_size: self.tile_size,
            downsample: self.downsample,
            snap_monochrome: self.snap_monochrome,
            sync_writes: self.sync_writes,
            parallel: self.parallel,
            labels: self.labels.clone(),
        };
        params.validate().map_err(|e| e.to_string())?;
        Ok(params)
    }
}

pub fn load_config(path: &Path) -> Result<BuildConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

/// Parse `[config.json] [--force|--incremental]` from the process arguments.
pub fn parse_cli(program: &str) -> Result<BuildConfig, String> {
    parse_args(program, std::env::args().skip(1))
}

pub fn parse_args(program: &str, args: impl IntoIterator<Item = String>) -> Result<BuildConfig, String> {
    let mut config_path = None;
    let mut mode = None;
    for arg in args {
        match arg.as_str() {
            "--force" => mode = Some(BuildMode::Force),
            "--incremental" => mode = Some(BuildMode::Incremental),
            "-h" | "--help" => return Err(usage(program)),
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown option {flag}\n{}", usage(program)))
            }
            path if config_path.is_none() => config_path = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument {extra}\n{}", usage(program))),
        }
    }
    let mut config = match config_path {
        Some(path) => load_config(&path)?,
        None => BuildConfig::default(),
    };
    if let Some(mode) = mode {
        config.mode = mode;
    }
    Ok(config)
}

fn usage(program: &str) -> String {
    format!("Usage: {program} [config.json] [--force | --incremental]")
}
