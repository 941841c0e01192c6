//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// tilecity command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "tilecity", about = "Decode a city map and style, then mesh the map")]
pub struct CliArgs {
    /// Map file name, relative to the data directory.
    #[arg(long)]
    pub map: Option<String>,

    /// Style file name, relative to the data directory.
    #[arg(long)]
    pub style: Option<String>,

    /// Directory holding the map and style files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Columns per mesh region side.
    #[arg(long)]
    pub region_size: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the tile and sprite atlases as PNG files into this directory.
    #[arg(long)]
    pub dump_atlases: Option<PathBuf>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref map) = args.map {
            self.assets.map_file = map.clone();
        }
        if let Some(ref style) = args.style {
            self.assets.style_file = style.clone();
        }
        if let Some(ref dir) = args.data_dir {
            self.assets.data_dir = dir.clone();
        }
        if let Some(size) = args.region_size {
            self.mesh.region_size = size;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.dump_atlases {
            self.debug.dump_atlases = Some(dir.clone());
        }
    }
}
