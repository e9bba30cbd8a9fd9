//! Global config file source: $XDG_CONFIG_HOME/barnstorm/config.toml or ~/.config/barnstorm/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(base.join("barnstorm").join("config.toml"))
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match global_config_path() {
        Some(path) if path.is_file() => {
            let canonical = dunce::canonicalize(&path).unwrap_or(path);
            debug!(config_path = %canonical.display(), "Using global config file");
            Ok(builder.add_source(File::from(canonical.as_path()).required(false)))
        }
        Some(path) => {
            debug!(config_path = %path.display(), "No global config file");
            Ok(builder)
        }
        None => Ok(builder),
    }
}
