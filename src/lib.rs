//! Barnstorm: project command runner
//!
//! Resolves abstract command names (`build`, `dev`, `test`, ...) to a concrete handler,
//! preferring a local override in the workspace, then an installed package under the
//! configured namespace, then a built-in.

pub mod cli;
pub mod command;
pub mod config;
pub mod environment;
pub mod error;
pub mod logging;
