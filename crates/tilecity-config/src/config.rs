//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tilecity_mesh::MeshSettings;
use tilecity_style::AtlasConfig;

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Where the map and style files are read from.
    pub assets: AssetConfig,
    /// Region meshing settings.
    pub mesh: MeshSettings,
    /// Atlas layout.
    pub atlas: AtlasConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Asset file locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory the file names below are relative to.
    pub data_dir: PathBuf,
    /// Map file, either format.
    pub map_file: String,
    /// Style file, either format.
    pub style_file: String,
}

impl AssetConfig {
    pub fn map_path(&self) -> PathBuf {
        self.data_dir.join(&self.map_file)
    }

    pub fn style_path(&self) -> PathBuf {
        self.data_dir.join(&self.style_file)
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write the decoded atlases as PNG files into this directory.
    pub dump_atlases: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            map_file: "wil.gmp".to_string(),
            style_file: "wil.sty".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            dump_atlases: None,
        }
    }
}

/// `<platform config dir>/tilecity`, or `./tilecity` when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilecity")
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Rejects settings the decoders and mesher cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.atlas.validate()?;
        if !(1..=256).contains(&self.mesh.region_size) {
            return Err(ConfigError::InvalidRegionSize(self.mesh.region_size));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("region_size: 16"));
        assert!(ron_str.contains("sprite_atlas_size: 2048"));
        assert!(ron_str.contains("map_file: \"wil.gmp\""));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.debug.dump_atlases = Some(PathBuf::from("out"));
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        let ron_str = "(assets: (map_file: \"NYC.CMP\"), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.assets.map_file, "NYC.CMP");
        assert_eq!(config.assets.style_file, "wil.sty");
        assert_eq!(config.mesh, MeshSettings::default());
        assert_eq!(config.atlas, AtlasConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_asset_paths() {
        let assets = AssetConfig {
            data_dir: PathBuf::from("/games/city"),
            ..AssetConfig::default()
        };
        assert_eq!(assets.map_path(), PathBuf::from("/games/city/wil.gmp"));
        assert_eq!(assets.style_path(), PathBuf::from("/games/city/wil.sty"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.mesh.region_size = 32;
        config.atlas.tile_margin = 2;
        config.assets.data_dir = PathBuf::from("assets");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.mesh.region_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRegionSize(0))
        ));

        let mut config = Config::default();
        config.atlas.sprite_atlas_size = 1000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAtlas(_))
        ));
    }
}
