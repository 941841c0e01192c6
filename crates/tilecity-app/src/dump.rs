//! Writes decoded atlases to disk as PNG files.

use std::path::{Path, PathBuf};

use tilecity_style::StyleAsset;

use crate::error::AppError;

pub const TILE_ATLAS_FILE: &str = "tile_atlas.png";
pub const SPRITE_ATLAS_FILE: &str = "sprite_atlas.png";

/// Saves the tile and sprite atlases into `dir`, creating it if needed.
pub fn dump_atlases(style: &StyleAsset, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir).map_err(|source| AppError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(2);
    for (name, image) in [
        (TILE_ATLAS_FILE, &style.tile_atlas().image),
        (SPRITE_ATLAS_FILE, &style.sprite_atlas().image),
    ] {
        let path = dir.join(name);
        image.save(&path).map_err(|source| AppError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "atlas written");
        written.push(path);
    }
    Ok(written)
}
