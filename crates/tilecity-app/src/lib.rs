//! The tilecity pipeline: load a map and a style, optionally dump the
//! atlases, then mesh every region of the map.

pub mod dump;
pub mod error;
pub mod loader;

use std::path::PathBuf;
use std::sync::Arc;

use tilecity_config::Config;
use tilecity_map::MapFormat;
use tilecity_mesh::RegionPipeline;
use tilecity_style::StyleFormat;

pub use error::AppError;

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub map_format: MapFormat,
    pub style_format: StyleFormat,
    pub regions: usize,
    pub non_empty_regions: usize,
    pub opaque_triangles: usize,
    pub transparent_triangles: usize,
    pub atlas_files: Vec<PathBuf>,
}

pub fn run(config: &Config) -> Result<RunSummary, AppError> {
    config.validate()?;
    let loader::Assets { map, style } = loader::load_assets(&config.assets, &config.atlas)?;

    let atlas_files = match &config.debug.dump_atlases {
        Some(dir) => dump::dump_atlases(&style, dir)?,
        None => Vec::new(),
    };

    let map_format = map.format();
    let style_format = style.format();
    let pipeline = RegionPipeline::new(Arc::new(map), Arc::new(style), &config.mesh);
    let results = pipeline.build_all();

    let non_empty: Vec<_> = results.iter().filter(|r| !r.mesh.is_empty()).collect();
    Ok(RunSummary {
        map_format,
        style_format,
        regions: results.len(),
        non_empty_regions: non_empty.len(),
        opaque_triangles: non_empty.iter().map(|r| r.mesh.opaque.triangle_count()).sum(),
        transparent_triangles: non_empty
            .iter()
            .map(|r| r.mesh.transparent.triangle_count())
            .sum(),
        atlas_files,
    })
}
