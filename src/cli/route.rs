//! CLI route: run context and dispatch. Builds the registry for one run and hands the
//! invocation to a runner.

use crate::cli::presentation::{format_resolution_json, format_resolution_text};
use crate::command::{
    register_builtins, CommandRegistry, ExitIntent, ResolveLayout, Runner, RunnerOptions,
};
use crate::config::{BarnstormConfig, ConfigLoader};
use crate::environment::Environment;
use crate::error::CliError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: loaded config, environment snapshot, and the registry.
/// Built from workspace path and optional config path using ConfigLoader only.
pub struct RunContext {
    config: BarnstormConfig,
    registry: CommandRegistry,
}

impl RunContext {
    /// Create run context from workspace root, optional config path and `-E` overrides.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        env_overrides: &[String],
    ) -> Result<Self, CliError> {
        let workspace_root = dunce::canonicalize(&workspace_root).map_err(|e| {
            CliError::ConfigError(format!(
                "Workspace not found: {}: {}",
                workspace_root.display(),
                e
            ))
        })?;

        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Err(errors) = config.validate() {
            let joined = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(CliError::ConfigError(joined));
        }

        let environment = Environment::capture(&workspace_root, env_overrides)?;
        let layout = ResolveLayout::from_config(&workspace_root, &config.runner, &environment);
        debug!(
            workspace = %workspace_root.display(),
            namespace = layout.namespace(),
            mode = %environment.mode(),
            "Run context created"
        );

        let mut registry = CommandRegistry::new(layout, Arc::new(environment));
        register_builtins(&mut registry)?;

        Ok(Self { config, registry })
    }

    pub fn config(&self) -> &BarnstormConfig {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            owns_process: self.config.runner.exit_on_stop,
            ..RunnerOptions::default()
        }
    }

    /// Run the command named by `argv[0]` with the remaining arguments.
    ///
    /// With `exit_on_stop` set the process ends inside the runner and this never returns.
    pub fn execute(&self, argv: Vec<String>) -> ExitIntent {
        info!(argv = ?argv, "Dispatching command");
        let mut runner = Runner::new(&self.registry, argv, self.runner_options());
        runner.start()
    }

    /// Describe where `name` resolves without running it.
    pub fn which(&self, name: &str, json: bool) -> Result<String, CliError> {
        let descriptor = self.registry.descriptor(name)?;
        let resolution = self.registry.resolve(name)?;
        if json {
            format_resolution_json(&resolution, &descriptor)
        } else {
            Ok(format_resolution_text(&resolution, &descriptor))
        }
    }
}
