pub mod build;

pub use build::{load_config, parse_cli, BuildConfig};
