//! Command registry and resolver.
//!
//! Maps abstract command names to concrete handlers through three tiers, highest first:
//! local overrides in the workspace (`bin/barnstorm-<command>`), installed packages under the
//! configured namespace (`@barnstorm/cli-<command>`), and built-in handlers.

pub mod builtin;
pub mod catalog;
pub mod context;
pub mod descriptor;
pub mod handler;
pub mod registry;
pub mod runner;

pub use builtin::register_builtins;
pub use catalog::{CatalogEntry, TOP_COMMANDS};
pub use context::{FlagValue, InvocationContext, ParsedFlags};
pub use descriptor::{CommandDescriptor, ResolveLayout, Source, Tier, DEFAULT_NAMESPACE};
pub use handler::{handler_fn, CommandHandler, HandlerRef, ProcessHandler};
pub use registry::{CommandListing, CommandRegistry, RegisterOptions, Resolution};
pub use runner::{ExitIntent, Runner, RunnerOptions, RunnerState};
