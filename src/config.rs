//! Configuration System
//!
//! Layered configuration for the runner: merge-policy defaults, then the user-level
//! file, then the workspace file(s), then `BARNSTORM__*` environment variables.

use crate::command::descriptor::{
    validate_command_name, DEFAULT_LOCAL_DIR, DEFAULT_LOCAL_PREFIX, DEFAULT_PACKAGES_DIR,
};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarnstormConfig {
    /// Command resolution settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Package namespace prefix; `Q_PACKAGE_NAMESPACE` takes precedence
    #[serde(default)]
    pub namespace: Option<String>,

    /// Local overrides directory, relative to the workspace root
    #[serde(default = "default_local_dir")]
    pub local_dir: PathBuf,

    /// File prefix for local overrides
    #[serde(default = "default_local_prefix")]
    pub local_prefix: String,

    /// Installed packages directory, relative to the workspace root
    #[serde(default = "default_packages_dir")]
    pub packages_dir: PathBuf,

    /// Extra remote-capable commands (never resolved from local overrides)
    #[serde(default = "default_remote_commands")]
    pub remote_commands: Vec<String>,

    /// Terminate the process from `stop` with the final exit code
    #[serde(default = "default_true")]
    pub exit_on_stop: bool,
}

fn default_local_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOCAL_DIR)
}

fn default_local_prefix() -> String {
    DEFAULT_LOCAL_PREFIX.to_string()
}

fn default_packages_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PACKAGES_DIR)
}

fn default_remote_commands() -> Vec<String> {
    vec!["test".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            local_dir: default_local_dir(),
            local_prefix: default_local_prefix(),
            packages_dir: default_packages_dir(),
            remote_commands: default_remote_commands(),
            exit_on_stop: default_true(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Runner(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Runner(msg) => write!(f, "Runner: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl RunnerConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(ref namespace) = self.namespace {
            if namespace.trim().is_empty() {
                errors.push("namespace cannot be empty when set".to_string());
            }
        }
        if self.local_dir.as_os_str().is_empty() {
            errors.push("local_dir cannot be empty".to_string());
        }
        if self.local_dir.is_absolute() {
            errors.push(format!(
                "local_dir must be relative to the workspace: {}",
                self.local_dir.display()
            ));
        }
        if self.packages_dir.as_os_str().is_empty() {
            errors.push("packages_dir cannot be empty".to_string());
        }
        if self.local_prefix.is_empty() || self.local_prefix.contains(['/', '\\']) {
            errors.push(format!("invalid local_prefix: {:?}", self.local_prefix));
        }
        for name in &self.remote_commands {
            if validate_command_name(name).is_err() {
                errors.push(format!("invalid remote command name: {:?}", name));
            }
        }
        errors
    }
}

impl BarnstormConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors: Vec<ValidationError> = self
            .runner
            .validate()
            .into_iter()
            .map(ValidationError::Runner)
            .collect();

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
