//! Runner: lifecycle of a single CLI invocation.
//!
//! `Created -> Initialized -> Resolving -> Resolved -> Executing -> (Completed | Failed) -> Stopped`
//!
//! Failures are terminal for the invocation and never retried. `stop` is the only place
//! that may terminate the process, and only when the runner was told it owns the process.

use crate::command::catalog;
use crate::command::context::InvocationContext;
use crate::command::registry::{CommandRegistry, Resolution};
use crate::error::RegistryError;
use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::{debug, error, info, warn};

/// Invocation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunnerState {
    Created,
    Initialized,
    Resolving,
    Resolved,
    Executing,
    Completed,
    Failed,
    Stopped,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunnerState::Created => "created",
            RunnerState::Initialized => "initialized",
            RunnerState::Resolving => "resolving",
            RunnerState::Resolved => "resolved",
            RunnerState::Executing => "executing",
            RunnerState::Completed => "completed",
            RunnerState::Failed => "failed",
            RunnerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Runner construction options
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Enter `Initialized` during construction
    pub init: bool,
    /// Call `start` during construction
    pub auto: bool,
    /// `stop` terminates the process with the final exit code
    pub owns_process: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            init: true,
            auto: false,
            owns_process: false,
        }
    }
}

/// Final exit code plus the error that caused it, if any
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExitIntent {
    pub code: i32,
    pub error: Option<String>,
}

impl ExitIntent {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn failure(code: i32, error: impl Into<String>) -> Self {
        Self {
            code,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// One invocation against a shared registry
pub struct Runner<'r> {
    ctx: InvocationContext<'r>,
    options: RunnerOptions,
    state: RunnerState,
    resolution: Option<Resolution>,
    failure: Option<ExitIntent>,
    exit: Option<ExitIntent>,
    out: Box<dyn Write + 'r>,
    err: Box<dyn Write + 'r>,
}

impl<'r> Runner<'r> {
    /// Runner writing handler output to stdout and failures to stderr.
    pub fn new(registry: &'r CommandRegistry, argv: Vec<String>, options: RunnerOptions) -> Self {
        Self::with_writers(
            registry,
            argv,
            options,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    pub fn with_writers(
        registry: &'r CommandRegistry,
        argv: Vec<String>,
        options: RunnerOptions,
        out: Box<dyn Write + 'r>,
        err: Box<dyn Write + 'r>,
    ) -> Self {
        let mut runner = Self {
            ctx: InvocationContext::from_argv(registry, argv),
            options,
            state: RunnerState::Created,
            resolution: None,
            failure: None,
            exit: None,
            out,
            err,
        };
        if options.init {
            // Cannot fail from Created.
            let _ = runner.init();
        }
        if options.auto {
            runner.start();
        }
        runner
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn context(&self) -> &InvocationContext<'r> {
        &self.ctx
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Set once the runner has stopped.
    pub fn exit_intent(&self) -> Option<&ExitIntent> {
        self.exit.as_ref()
    }

    fn expect_state(
        &self,
        expected: RunnerState,
        operation: &'static str,
    ) -> Result<(), RegistryError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(RegistryError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Sanity-check the command token. Entered once.
    pub fn init(&mut self) -> Result<(), RegistryError> {
        self.expect_state(RunnerState::Created, "init")?;
        match self.ctx.command() {
            Some(command) if catalog::is_top_command(command) => {
                debug!(command, "Top-level command requested")
            }
            Some(command) => debug!(command, "Command outside the catalog requested"),
            None => debug!("No command requested"),
        }
        self.state = RunnerState::Initialized;
        Ok(())
    }

    /// Resolve the command token to a single tier.
    pub fn resolve(&mut self) -> Result<Resolution, RegistryError> {
        self.expect_state(RunnerState::Initialized, "resolve")?;
        let command = self
            .ctx
            .command()
            .ok_or_else(|| RegistryError::InvalidCommandName(String::new()))?
            .to_string();

        self.state = RunnerState::Resolving;
        match self.ctx.registry().resolve(&command) {
            Ok(resolution) => {
                self.state = RunnerState::Resolved;
                self.resolution = Some(resolution.clone());
                Ok(resolution)
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Resolve if needed, then execute the handler.
    pub fn invoke(&mut self) -> Result<String, RegistryError> {
        if self.state == RunnerState::Initialized {
            self.resolve()?;
        }
        self.expect_state(RunnerState::Resolved, "invoke")?;
        let resolution = match self.resolution.clone() {
            Some(resolution) => resolution,
            None => {
                return Err(RegistryError::InvalidState {
                    operation: "invoke",
                    state: self.state,
                })
            }
        };

        self.state = RunnerState::Executing;
        match self.ctx.registry().invoke_resolved(&resolution, &self.ctx) {
            Ok(output) => {
                self.state = RunnerState::Completed;
                Ok(output)
            }
            Err(e) => {
                self.record_failure(&e);
                Err(e)
            }
        }
    }

    /// Run the invocation to completion and stop.
    ///
    /// Without a command token this is the default task, which only warns.
    pub fn start(&mut self) -> ExitIntent {
        if self.state == RunnerState::Stopped {
            return self.exit.clone().unwrap_or_default();
        }
        if self.ctx.command().is_none() {
            warn!("Running a default task! You probably want to pass a command");
            return self.stop(None);
        }
        match self.state {
            RunnerState::Created => {
                let _ = self.init();
            }
            // Already ran (or failed) through manual calls; only the stop remains.
            RunnerState::Completed | RunnerState::Failed => return self.stop(None),
            _ => {}
        }

        match self.invoke() {
            Ok(output) => {
                if !output.is_empty() {
                    let _ = if output.ends_with('\n') {
                        write!(self.out, "{}", output)
                    } else {
                        writeln!(self.out, "{}", output)
                    };
                }
            }
            Err(e) => {
                error!(error = %e, "Command failed");
                let _ = writeln!(self.err, "{}", e);
            }
        }
        self.stop(None)
    }

    /// Terminal transition. Exit code: explicit, else the recorded failure, else 0.
    ///
    /// Stopping twice returns the first exit intent unchanged.
    pub fn stop(&mut self, code: Option<i32>) -> ExitIntent {
        if let Some(ref exit) = self.exit {
            return exit.clone();
        }

        let recorded = self.failure.clone();
        let intent = match code {
            Some(code) => ExitIntent {
                code,
                error: recorded.and_then(|f| f.error),
            },
            None => recorded.unwrap_or_else(ExitIntent::success),
        };

        info!(code = intent.code, state = %self.state, "Stopping the program");
        self.state = RunnerState::Stopped;
        self.exit = Some(intent.clone());

        if self.options.owns_process {
            let _ = self.out.flush();
            let _ = self.err.flush();
            std::process::exit(intent.code);
        }
        intent
    }

    /// Record a failure. `throwable` surfaces it as [`RegistryError::FatalCommand`]
    /// instead of stopping.
    pub fn fail(
        &mut self,
        error: impl fmt::Display,
        throwable: bool,
    ) -> Result<ExitIntent, RegistryError> {
        if self.state == RunnerState::Stopped {
            return Err(RegistryError::InvalidState {
                operation: "fail",
                state: self.state,
            });
        }
        let message = error.to_string();
        warn!(error = %message, throwable, "Failed");
        self.failure = Some(ExitIntent::failure(1, message.clone()));
        self.state = RunnerState::Failed;

        if throwable {
            return Err(RegistryError::FatalCommand(message));
        }
        Ok(self.stop(None))
    }

    fn record_failure(&mut self, error: &RegistryError) {
        self.failure = Some(ExitIntent::failure(error.exit_code(), error.to_string()));
        self.state = RunnerState::Failed;
    }
}
