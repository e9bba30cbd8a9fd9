//! Error types for the barnstorm command runner.

use crate::command::Tier;
use thiserror::Error;

/// Registry and invocation lifecycle errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Binding already exists: {0} (use rebind to replace it)")]
    DuplicateBinding(String),

    #[error("Cannot rebind unknown binding: {0}")]
    UnknownBinding(String),

    #[error("Command not found: {name} (searched: {searched})")]
    UnresolvedCommand { name: String, searched: String },

    #[error("Command '{name}' failed ({tier}): {source}")]
    CommandExecution {
        name: String,
        tier: Tier,
        #[source]
        source: HandlerError,
    },

    #[error("Fatal: {0}")]
    FatalCommand(String),

    #[error("Invalid command name: {0:?}")]
    InvalidCommandName(String),

    #[error("Invalid runner state: cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: crate::command::RunnerState,
    },
}

impl RegistryError {
    /// Exit code reported to the shell for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RegistryError::CommandExecution {
                source: HandlerError::ExitStatus(code),
                ..
            } if *code != 0 => *code,
            RegistryError::UnresolvedCommand { .. } => 127,
            _ => 1,
        }
    }
}

/// Failures raised by a command handler while it runs
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("exited with status {0}")]
    ExitStatus(i32),

    #[error("failed to spawn {path}: {source}")]
    Spawn {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no handler bound for package {0}")]
    NotLoadable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Top-level errors surfaced by the CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        CliError::ConfigError(err.to_string())
    }
}
