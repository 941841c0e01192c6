//! Decodes a city map and style and meshes the map.

use clap::Parser;
use tilecity_config::{CliArgs, Config, default_config_dir};
use tracing::{error, info};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    tilecity_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match tilecity_app::run(&config) {
        Ok(summary) => info!(
            map = ?summary.map_format,
            style = ?summary.style_format,
            regions = summary.regions,
            non_empty = summary.non_empty_regions,
            opaque = summary.opaque_triangles,
            transparent = summary.transparent_triangles,
            "done"
        ),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
