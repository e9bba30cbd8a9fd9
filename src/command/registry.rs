//! Command registry: bindings plus tiered resolution.
//!
//! A binding maps a key (a command name, a local override key such as
//! `./bin/barnstorm-build`, or a package key such as `@barnstorm/cli-build`) to a handler.
//! Resolution walks a command's sources in precedence order and picks the first tier
//! whose key is bound or whose path exists on disk.

use crate::command::catalog::{self, TOP_COMMANDS};
use crate::command::context::InvocationContext;
use crate::command::descriptor::{CommandDescriptor, ResolveLayout, Source, Tier};
use crate::command::handler::{HandlerRef, ProcessHandler};
use crate::environment::Environment;
use crate::error::{HandlerError, RegistryError};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Options for [`CommandRegistry::register`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterOptions {
    pub allow_override: bool,
}

/// Outcome of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub name: String,
    pub tier: Tier,
    pub key: String,
    pub path: Option<PathBuf>,
}

/// One row of the command listing used by `help`
#[derive(Debug, Clone, Serialize)]
pub struct CommandListing {
    pub name: String,
    pub summary: Option<String>,
    pub remote: bool,
    pub resolution: Option<Resolution>,
}

/// Registry of command bindings for one CLI run
pub struct CommandRegistry {
    layout: ResolveLayout,
    environment: Arc<Environment>,
    bindings: HashMap<String, HandlerRef>,
}

impl CommandRegistry {
    pub fn new(layout: ResolveLayout, environment: Arc<Environment>) -> Self {
        Self {
            layout,
            environment,
            bindings: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &ResolveLayout {
        &self.layout
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Add a binding. An existing key is only replaced when `allow_override` is set.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        handler: HandlerRef,
        options: RegisterOptions,
    ) -> Result<(), RegistryError> {
        let key = key.into();
        if self.bindings.contains_key(&key) && !options.allow_override {
            return Err(RegistryError::DuplicateBinding(key));
        }
        debug!(key = %key, handler = %handler.describe(), "Registered binding");
        self.bindings.insert(key, handler);
        Ok(())
    }

    /// Add a binding that must not exist yet.
    pub fn bind(&mut self, key: impl Into<String>, handler: HandlerRef) -> Result<(), RegistryError> {
        self.register(key, handler, RegisterOptions::default())
    }

    /// Replace an existing binding. Rebinding is replacement, never creation.
    pub fn rebind(&mut self, key: &str, handler: HandlerRef) -> Result<(), RegistryError> {
        match self.bindings.get_mut(key) {
            Some(slot) => {
                debug!(key = %key, handler = %handler.describe(), "Rebound binding");
                *slot = handler;
                Ok(())
            }
            None => Err(RegistryError::UnknownBinding(key.to_string())),
        }
    }

    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<HandlerRef> {
        self.bindings.get(key).cloned()
    }

    /// Bound keys in sorted order.
    pub fn binding_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn descriptor(&self, name: &str) -> Result<CommandDescriptor, RegistryError> {
        CommandDescriptor::new(name, &self.layout)
    }

    /// Resolve a command to exactly one tier. Never mutates bindings.
    pub fn resolve(&self, name: &str) -> Result<Resolution, RegistryError> {
        let descriptor = self.descriptor(name)?;
        for source in descriptor.sources() {
            if self.source_exists(source) {
                debug!(command = %name, tier = %source.tier, key = %source.key, "Resolved command");
                return Ok(Resolution {
                    name: name.to_string(),
                    tier: source.tier,
                    key: source.key.clone(),
                    path: source.path.clone(),
                });
            }
            debug!(command = %name, tier = %source.tier, key = %source.key, "Tier has no target");
        }

        let searched = descriptor
            .sources()
            .iter()
            .map(|s| s.key.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(RegistryError::UnresolvedCommand {
            name: name.to_string(),
            searched,
        })
    }

    fn source_exists(&self, source: &Source) -> bool {
        self.bindings.contains_key(&source.key)
            || source.path.as_ref().map(|p| p.exists()).unwrap_or(false)
    }

    /// Load the handler for a resolution: the binding for its key, else the file on disk.
    pub fn load(&self, resolution: &Resolution) -> Result<HandlerRef, RegistryError> {
        if let Some(handler) = self.get(&resolution.key) {
            return Ok(handler);
        }
        match resolution.path {
            Some(ref path) if path.is_file() => Ok(Arc::new(ProcessHandler::new(path.clone()))),
            _ => Err(RegistryError::CommandExecution {
                name: resolution.name.clone(),
                tier: resolution.tier,
                source: HandlerError::NotLoadable(resolution.key.clone()),
            }),
        }
    }

    /// Resolve then execute. No handler runs when resolution fails.
    pub fn invoke(&self, name: &str, ctx: &InvocationContext<'_>) -> Result<String, RegistryError> {
        let resolution = self.resolve(name)?;
        self.invoke_resolved(&resolution, ctx)
    }

    /// Execute an already-resolved command.
    pub fn invoke_resolved(
        &self,
        resolution: &Resolution,
        ctx: &InvocationContext<'_>,
    ) -> Result<String, RegistryError> {
        let handler = self.load(resolution)?;
        info!(
            command = %resolution.name,
            tier = %resolution.tier,
            handler = %handler.describe(),
            "Invoking command"
        );
        handler
            .start(ctx)
            .map_err(|source| RegistryError::CommandExecution {
                name: resolution.name.clone(),
                tier: resolution.tier,
                source,
            })
    }

    /// Local override command names found in the local overrides directory.
    pub fn discover_local(&self) -> Vec<String> {
        let dir = self.layout.local_dir_path();
        if !dir.is_dir() {
            return Vec::new();
        }
        let prefix = format!("{}-", self.layout.local_prefix());
        // Overrides are often symlinks into a scripts directory.
        let mut names: Vec<String> = WalkDir::new(&dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|file| file.strip_prefix(prefix.as_str()))
                    .map(str::to_string)
            })
            .filter(|name| crate::command::descriptor::validate_command_name(name).is_ok())
            .collect();
        names.sort();
        names
    }

    /// Catalog commands, bound built-ins and discovered local overrides, with their resolution.
    pub fn list_commands(&self) -> Vec<CommandListing> {
        let mut names: BTreeSet<String> =
            TOP_COMMANDS.iter().map(|e| e.name.to_string()).collect();
        names.extend(self.discover_local());
        names.extend(
            self.bindings
                .keys()
                .filter(|key| crate::command::descriptor::validate_command_name(key).is_ok())
                .cloned(),
        );

        names
            .into_iter()
            .map(|name| {
                let entry = catalog::lookup(&name);
                CommandListing {
                    summary: entry.map(|e| e.summary.to_string()),
                    remote: self.layout.is_remote(&name),
                    resolution: self.resolve(&name).ok(),
                    name,
                }
            })
            .collect()
    }
}
