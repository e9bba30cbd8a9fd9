//! CLI domain: parse, route, output, and presentation only.
//! Resolution and execution live in the command module.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{exit_code, map_error};
pub use parse::Cli;
pub use presentation::{format_resolution_json, format_resolution_text};
pub use route::RunContext;
