//! Merge rules: defaults applied before any file or environment source.

use crate::command::descriptor::{DEFAULT_LOCAL_DIR, DEFAULT_LOCAL_PREFIX, DEFAULT_PACKAGES_DIR};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("runner.local_dir", DEFAULT_LOCAL_DIR)?
        .set_default("runner.local_prefix", DEFAULT_LOCAL_PREFIX)?
        .set_default("runner.packages_dir", DEFAULT_PACKAGES_DIR)?
        .set_default("runner.remote_commands", vec!["test"])?
        .set_default("runner.exit_on_stop", true)
}
