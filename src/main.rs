use std::env;
use tile_pyramid::config::{self, BuildConfig};
use tile_pyramid::image::save_json;
use tile_pyramid::{BuildOrchestrator, BuildSummary, PhaseReport};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

/// Returns whether every tile was brought up to date.
fn run() -> Result<bool, String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "tile-pyramid".to_string());
    let config = config::parse_cli(&program)?;
    let params = config.pyramid_params()?;

    let orchestrator = BuildOrchestrator::new(&config.parcels_dir, &config.output_dir, params)
        .map_err(|e| e.to_string())?;
    let summary = orchestrator.run(config.mode).map_err(|e| e.to_string())?;

    print_text_summary(&config, &summary);
    if let Some(path) = &config.summary_json {
        save_json(path, &summary)?;
        println!("JSON summary written to {}", path.display());
    }
    Ok(summary.is_success())
}

fn print_text_summary(config: &BuildConfig, summary: &BuildSummary) {
    println!("Build summary ({})", summary.mode);
    println!("  parcels dir: {}", config.parcels_dir.display());
    println!("  output dir:  {}", config.output_dir.display());
    println!("  parcels found: {}", summary.parcels_found);
    for layer in summary.layers() {
        println!("  {}:", layer.layer);
        print_phase("leaf", &layer.leaf);
        for level in &layer.levels {
            print_phase("level", level);
        }
    }
    println!(
        "  total: {} written, {} failed in {:.1} ms",
        summary.total_written(),
        summary.total_failed(),
        summary.timing.total_ms
    );
    if let Some(stage) = summary.timing.slowest() {
        println!("  slowest step: {} ({:.1} ms)", stage.stage, stage.elapsed_ms);
    }
    if summary.is_success() {
        if summary.total_written() == 0 {
            println!("All tiles are up to date.");
        }
        return;
    }
    println!("Failures:");
    for layer in summary.layers() {
        for failure in layer.phases().flat_map(|p| p.failures.iter()) {
            println!(
                "  {}/{} [{:?}] {}",
                layer.layer, failure.tile, failure.kind, failure.message
            );
        }
    }
}

fn print_phase(label: &str, phase: &PhaseReport) {
    println!(
        "    {label} {:>2}: rebuilt {}, up-to-date {}, placeholders {}, failed {}",
        phase.zoom, phase.rebuilt, phase.up_to_date, phase.placeholders_created, phase.failed
    );
}
