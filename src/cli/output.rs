//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::CliError;

/// Map errors to a string for CLI output.
pub fn map_error(e: &CliError) -> String {
    e.to_string()
}

/// Exit code for errors raised before a runner exists.
pub fn exit_code(e: &CliError) -> i32 {
    match e {
        CliError::Registry(registry) => registry.exit_code(),
        _ => 1,
    }
}
