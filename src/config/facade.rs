//! Config loading facade: the single entry point for building a `BarnstormConfig`.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::BarnstormConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment overrides (`BARNSTORM__RUNNER__NAMESPACE=...`)
const ENV_PREFIX: &str = "BARNSTORM";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence, lowest to highest: defaults, global file, workspace files, environment.
    pub fn load(workspace_root: &Path) -> Result<BarnstormConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let config = builder.add_source(env_source()).build()?;
        let loaded: BarnstormConfig = config.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Configuration loaded");
        Ok(loaded)
    }

    /// Load configuration from an explicit file; environment overrides still apply.
    pub fn load_from_file(path: &Path) -> Result<BarnstormConfig, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = merge_policy::builder_with_defaults()?
            .add_source(File::from(path))
            .add_source(env_source())
            .build()?;
        config.try_deserialize()
    }

    /// User-level config file location, if one can be determined.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("runner.remote_commands")
}
