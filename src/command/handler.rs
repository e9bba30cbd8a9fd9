//! Command handlers: the executable units bound to command names.

use crate::command::context::InvocationContext;
use crate::error::HandlerError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared handler reference stored in the registry
pub type HandlerRef = Arc<dyn CommandHandler>;

/// A runnable command.
///
/// What a handler does (build pipeline, dev server, test harness) is opaque to the registry.
/// The returned string is written to stdout by the runner when non-empty.
pub trait CommandHandler: Send + Sync {
    /// Entry point. The default implementation does nothing and says so.
    fn start(&self, ctx: &InvocationContext<'_>) -> Result<String, HandlerError> {
        warn!(
            command = ctx.command().unwrap_or_default(),
            "Running a default task! Handlers should override start()"
        );
        Ok(String::new())
    }

    /// Short label used in logs and help output.
    fn describe(&self) -> String {
        "in-process handler".to_string()
    }
}

/// Handler backed by a closure
pub struct FnHandler<F> {
    func: F,
    label: String,
}

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn(&InvocationContext<'_>) -> Result<String, HandlerError> + Send + Sync,
{
    fn start(&self, ctx: &InvocationContext<'_>) -> Result<String, HandlerError> {
        (self.func)(ctx)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Wrap a closure as a handler reference.
pub fn handler_fn<F>(label: impl Into<String>, func: F) -> HandlerRef
where
    F: Fn(&InvocationContext<'_>) -> Result<String, HandlerError> + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        func,
        label: label.into(),
    })
}

/// Runs an executable found on disk (a local override or an installed package binary).
///
/// The child inherits stdio and the process environment, plus the variables the
/// environment snapshot exports, and runs from the workspace root.
#[derive(Debug, Clone)]
pub struct ProcessHandler {
    path: PathBuf,
}

impl ProcessHandler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandHandler for ProcessHandler {
    fn start(&self, ctx: &InvocationContext<'_>) -> Result<String, HandlerError> {
        debug!(path = %self.path.display(), args = ?ctx.args(), "Spawning external command");
        let status = Command::new(&self.path)
            .args(ctx.args())
            .current_dir(ctx.workspace_root())
            .envs(ctx.environment().exported())
            .status()
            .map_err(|source| HandlerError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        if status.success() {
            Ok(String::new())
        } else {
            // Killed by a signal has no code; report a generic failure.
            Err(HandlerError::ExitStatus(status.code().unwrap_or(1)))
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
