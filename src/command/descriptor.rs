//! Command descriptors: where a command may live, highest precedence first.

use crate::command::catalog;
use crate::config::RunnerConfig;
use crate::environment::Environment;
use crate::error::RegistryError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Default package namespace when neither the environment nor config sets one
pub const DEFAULT_NAMESPACE: &str = "@barnstorm/cli";
/// Default local overrides directory, relative to the workspace root
pub const DEFAULT_LOCAL_DIR: &str = "bin";
/// Default file prefix for local overrides (`bin/barnstorm-<command>`)
pub const DEFAULT_LOCAL_PREFIX: &str = "barnstorm";
/// Default directory holding installed packages
pub const DEFAULT_PACKAGES_DIR: &str = "node_modules";

/// One precedence level in command resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    LocalOverride,
    NamespacedPackage,
    BuiltIn,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::LocalOverride => "local-override",
            Tier::NamespacedPackage => "namespaced-package",
            Tier::BuiltIn => "built-in",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directory layout and naming rules used to derive command sources.
///
/// Built once from config and the environment snapshot; never re-reads process state.
#[derive(Debug, Clone)]
pub struct ResolveLayout {
    workspace_root: PathBuf,
    local_dir: PathBuf,
    local_prefix: String,
    packages_dir: PathBuf,
    namespace: String,
    remote: BTreeSet<String>,
    framework_mode: bool,
}

impl ResolveLayout {
    /// Layout with default directories and namespace.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            local_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
            local_prefix: DEFAULT_LOCAL_PREFIX.to_string(),
            packages_dir: PathBuf::from(DEFAULT_PACKAGES_DIR),
            namespace: DEFAULT_NAMESPACE.to_string(),
            remote: BTreeSet::new(),
            framework_mode: false,
        }
    }

    /// Namespace precedence: environment, then config, then the default.
    pub fn from_config(
        workspace_root: impl Into<PathBuf>,
        config: &RunnerConfig,
        env: &Environment,
    ) -> Self {
        let namespace = env
            .namespace_override()
            .map(str::to_string)
            .or_else(|| {
                config
                    .namespace
                    .as_deref()
                    .map(str::trim)
                    .filter(|ns| !ns.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

        Self {
            workspace_root: workspace_root.into(),
            local_dir: config.local_dir.clone(),
            local_prefix: config.local_prefix.clone(),
            packages_dir: config.packages_dir.clone(),
            namespace,
            remote: config.remote_commands.iter().cloned().collect(),
            framework_mode: env.framework_mode(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_remote(mut self, name: impl Into<String>) -> Self {
        self.remote.insert(name.into());
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn framework_mode(&self) -> bool {
        self.framework_mode
    }

    pub fn local_prefix(&self) -> &str {
        &self.local_prefix
    }

    /// Absolute local overrides directory.
    pub fn local_dir_path(&self) -> PathBuf {
        self.workspace_root.join(&self.local_dir)
    }

    /// `remote` from the catalog, or listed in config.
    pub fn is_remote(&self, name: &str) -> bool {
        catalog::lookup(name).map(|e| e.remote).unwrap_or(false) || self.remote.contains(name)
    }

    /// `./<local_dir>/<prefix>-<name>`; `bin`, `./bin` and `bin/` give the same key.
    pub fn local_key(&self, name: &str) -> String {
        let dir = self
            .local_dir
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                Component::ParentDir => Some("..".into()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        if dir.is_empty() {
            format!("./{}-{}", self.local_prefix, name)
        } else {
            format!("./{}/{}-{}", dir, self.local_prefix, name)
        }
    }

    pub fn local_path(&self, name: &str) -> PathBuf {
        self.local_dir_path()
            .join(format!("{}-{}", self.local_prefix, name))
    }

    pub fn namespaced_key(&self, name: &str) -> String {
        format!("{}-{}", self.namespace, name)
    }

    pub fn namespaced_path(&self, name: &str) -> PathBuf {
        self.workspace_root
            .join(&self.packages_dir)
            .join(self.namespaced_key(name))
    }
}

/// A single candidate location for a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub tier: Tier,
    /// Binding key checked in the registry for this tier
    pub key: String,
    /// Filesystem target for this tier; the built-in tier has none
    pub path: Option<PathBuf>,
}

/// Ordered resolution sources for one command name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    name: String,
    remote: bool,
    sources: Vec<Source>,
}

impl CommandDescriptor {
    pub fn new(name: &str, layout: &ResolveLayout) -> Result<Self, RegistryError> {
        validate_command_name(name)?;
        let remote = layout.is_remote(name);

        let mut sources = Vec::with_capacity(3);
        if !remote {
            sources.push(Source {
                tier: Tier::LocalOverride,
                key: layout.local_key(name),
                path: Some(layout.local_path(name)),
            });
        }
        sources.push(Source {
            tier: Tier::NamespacedPackage,
            key: layout.namespaced_key(name),
            path: Some(layout.namespaced_path(name)),
        });
        sources.push(Source {
            tier: Tier::BuiltIn,
            key: name.to_string(),
            path: None,
        });

        Ok(Self {
            name: name.to_string(),
            remote,
            sources,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_remote(&self) -> bool {
        self.remote
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source(&self, tier: Tier) -> Option<&Source> {
        self.sources.iter().find(|s| s.tier == tier)
    }
}

/// Command names become file name suffixes, so they must not carry path syntax.
pub fn validate_command_name(name: &str) -> Result<(), RegistryError> {
    let valid = !name.is_empty()
        && !name.starts_with('-')
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidCommandName(name.to_string()))
    }
}
