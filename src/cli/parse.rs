//! CLI parse: clap types for barnstorm. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Barnstorm - project command runner with local and package overrides
///
/// Everything after the command name is passed to the command untouched.
#[derive(Parser, Debug)]
#[command(name = "barnstorm")]
#[command(about = "Run project commands from local overrides, namespaced packages, or built-ins")]
pub struct Cli {
    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Set an environment variable for this run (KEY=VALUE, repeatable)
    #[arg(short = 'E', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Print where the command resolves instead of running it
    #[arg(long)]
    pub which: bool,

    /// Print `--which` output as JSON
    #[arg(long, requires = "which")]
    pub json: bool,

    /// Command name followed by its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub argv: Vec<String>,
}

impl Cli {
    /// The requested command name, if any.
    pub fn command_name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }
}
