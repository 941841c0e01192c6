//! Configuration for the tilecity tools.
//!
//! Settings persist to disk as a RON file and can be overridden from the
//! command line via clap.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetConfig, Config, DebugConfig, default_config_dir};
pub use error::ConfigError;
pub use tilecity_mesh::MeshSettings;
pub use tilecity_style::AtlasConfig;
