//! Workspace config file sources: barnstorm.toml, then config/{env}.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

/// Workspace config file name
pub const WORKSPACE_CONFIG_FILE: &str = "barnstorm.toml";

/// Add workspace config files to builder.
/// Precedence: barnstorm.toml (base) then config/{BARNSTORM_ENV}.toml (env-specific).
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env_name = std::env::var("BARNSTORM_ENV").unwrap_or_else(|_| "development".to_string());

    let base_config_path = workspace_root.join(WORKSPACE_CONFIG_FILE);
    if base_config_path.is_file() {
        builder = builder.add_source(File::from(base_config_path.as_path()).required(false));
    }

    let env_config_path = workspace_root
        .join("config")
        .join(format!("{}.toml", env_name));
    if env_config_path.is_file() {
        builder = builder.add_source(File::from(env_config_path.as_path()).required(false));
    }

    Ok(builder)
}
