//! Raw-bytes loading and decoding of the map and style files.

use std::path::Path;

use tilecity_config::AssetConfig;
use tilecity_map::{Map, load_map};
use tilecity_style::{AtlasConfig, StyleAsset, load_style};
use tracing::info;

use crate::error::AppError;

/// Reads a whole asset file.
pub fn load_file(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_map_file(path: &Path) -> Result<Map, AppError> {
    let data = load_file(path)?;
    let map = load_map(&data).map_err(|source| AppError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        format = ?map.format(),
        blocks = map.block_count(),
        cells = map.occupied_cells(),
        lights = map.lights().len(),
        areas = map.areas().len(),
        "map decoded"
    );
    Ok(map)
}

pub fn load_style_file(path: &Path, atlas: &AtlasConfig) -> Result<StyleAsset, AppError> {
    let data = load_file(path)?;
    let style = load_style(&data, atlas).map_err(|source| AppError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        format = ?style.format(),
        tiles = style.tile_counts().total(),
        sprites = style.sprite_atlas().len(),
        palettes = style.palettes().palette_count(),
        vehicles = style.vehicles().len(),
        "style decoded"
    );
    Ok(style)
}

/// The decoded asset pair.
#[derive(Debug)]
pub struct Assets {
    pub map: Map,
    pub style: StyleAsset,
}

/// Loads and decodes the map and style at once; they share nothing until
/// meshing.
pub fn load_assets(assets: &AssetConfig, atlas: &AtlasConfig) -> Result<Assets, AppError> {
    let map_path = assets.map_path();
    let style_path = assets.style_path();

    let (map, style) = std::thread::scope(|s| {
        let style = s.spawn(|| load_style_file(&style_path, atlas));
        let map = load_map_file(&map_path);
        let style = style
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (map, style)
    });

    Ok(Assets {
        map: map?,
        style: style?,
    })
}
