//! Environment snapshot
//!
//! Process state that affects command resolution is captured once at startup into an
//! immutable [`Environment`]. Sources, lowest to highest precedence: the workspace `.env`
//! file, the process environment, then explicit `KEY=VALUE` overrides from the command line.
//! Nothing here writes back into the process environment; external command handlers receive
//! the derived variables explicitly.

use crate::error::CliError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Namespace override variable
pub const NAMESPACE_VAR: &str = "Q_PACKAGE_NAMESPACE";
/// Framework-mode flag variable
pub const FRAMEWORK_VAR: &str = "Q_FRAMEWORK";
/// Package manager used when running in framework mode
pub const PACKAGE_MANAGER_VAR: &str = "Q_PACKAGE_MANAGER";
/// Explicit environment mode
pub const MODE_VAR: &str = "Q_ENV";
/// Fallback mode variable
pub const NODE_ENV_VAR: &str = "NODE_ENV";

const APP_NAME_VAR: &str = "Q_APP_NAME";
const APP_SRC_PATH_VAR: &str = "Q_APP_SRC_PATH";
const DEFAULT_SRC_PATH: &str = "src";

/// Environment mode derived from `Q_ENV` / `NODE_ENV`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvMode {
    Develop,
    Production,
    Other(String),
}

impl EnvMode {
    fn parse(value: &str) -> Self {
        match value {
            "develop" => EnvMode::Develop,
            "production" => EnvMode::Production,
            other => EnvMode::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EnvMode::Develop => "develop",
            EnvMode::Production => "production",
            EnvMode::Other(value) => value,
        }
    }
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which variables `Environment::list` reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvScope {
    /// `Q_*` only
    Framework,
    /// `Q_*` and `HOST_*`
    Verbose,
    /// Everything captured
    All,
}

impl EnvScope {
    fn includes(&self, key: &str) -> bool {
        match self {
            EnvScope::Framework => key.starts_with("Q_"),
            EnvScope::Verbose => key.starts_with("Q_") || key.starts_with("HOST_"),
            EnvScope::All => true,
        }
    }
}

/// Immutable view of the variables relevant to one CLI run
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    /// Variables not inherited from the process (`.env` and overrides) plus derived ones.
    exported: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the environment for a workspace: `.env`, process variables, then overrides.
    pub fn capture(workspace_root: &Path, overrides: &[String]) -> Result<Self, CliError> {
        let dotenv_path = workspace_root.join(".env");
        let mut dotenv = Vec::new();
        if dotenv_path.is_file() {
            let entries = dotenvy::from_path_iter(&dotenv_path).map_err(|e| {
                CliError::ConfigError(format!(
                    "Failed to read {}: {}",
                    dotenv_path.display(),
                    e
                ))
            })?;
            for entry in entries {
                let (key, value) = entry.map_err(|e| {
                    CliError::ConfigError(format!(
                        "Invalid entry in {}: {}",
                        dotenv_path.display(),
                        e
                    ))
                })?;
                dotenv.push((key, value));
            }
            debug!(path = %dotenv_path.display(), count = dotenv.len(), "Loaded .env file");
        }
        Self::from_sources(dotenv, utf8_vars(std::env::vars_os()), overrides)
    }

    /// Build a snapshot from explicit sources.
    pub fn from_sources<D, P>(dotenv: D, process: P, overrides: &[String]) -> Result<Self, CliError>
    where
        D: IntoIterator<Item = (String, String)>,
        P: IntoIterator<Item = (String, String)>,
    {
        let mut vars = BTreeMap::new();
        let mut exported = BTreeMap::new();

        for (key, value) in dotenv {
            vars.insert(key.clone(), value.clone());
            exported.insert(key, value);
        }
        for (key, value) in process {
            // Process variables win over .env values, and the child inherits them anyway.
            exported.remove(&key);
            vars.insert(key, value);
        }
        for entry in overrides {
            let (key, value) = parse_assignment(entry)?;
            vars.insert(key.clone(), value.clone());
            exported.insert(key, value);
        }

        let mut env = Self { vars, exported };
        let mode = env.mode();
        if env.is_set(MODE_VAR) {
            env.exported
                .insert(NODE_ENV_VAR.to_string(), mode.as_str().to_string());
        }
        env.exported
            .insert(MODE_VAR.to_string(), mode.as_str().to_string());
        Ok(env)
    }

    /// Build a snapshot from key/value pairs only (no `.env`, no overrides).
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: Vec<(String, String)> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        // No overrides means parsing cannot fail.
        Self::from_sources(Vec::new(), pairs, &[]).unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// `Q_ENV`, else `NODE_ENV`, else develop.
    pub fn mode(&self) -> EnvMode {
        self.non_empty(MODE_VAR)
            .or_else(|| self.non_empty(NODE_ENV_VAR))
            .map(EnvMode::parse)
            .unwrap_or(EnvMode::Develop)
    }

    pub fn is_develop(&self) -> bool {
        self.mode() == EnvMode::Develop
    }

    pub fn is_production(&self) -> bool {
        self.mode() == EnvMode::Production
    }

    /// Namespace prefix requested through the environment, if any.
    pub fn namespace_override(&self) -> Option<&str> {
        self.non_empty(NAMESPACE_VAR)
    }

    pub fn framework_mode(&self) -> bool {
        self.non_empty(FRAMEWORK_VAR)
            .map(|value| {
                matches!(
                    value.to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(false)
    }

    pub fn package_manager(&self) -> Option<&str> {
        self.non_empty(PACKAGE_MANAGER_VAR)
    }

    pub fn app_name(&self) -> Option<&str> {
        self.non_empty(APP_NAME_VAR)
    }

    pub fn app_src_path(&self) -> &str {
        self.non_empty(APP_SRC_PATH_VAR).unwrap_or(DEFAULT_SRC_PATH)
    }

    /// Sorted `KEY=VALUE` lines for the requested scope.
    pub fn list(&self, scope: EnvScope) -> Vec<String> {
        self.vars
            .iter()
            .filter(|(key, _)| scope.includes(key))
            .map(|(key, value)| format!("{}={}", key, value))
            .collect()
    }

    /// Variables an external handler must receive on top of the inherited process environment.
    pub fn exported(&self) -> impl Iterator<Item = (&str, &str)> {
        self.exported
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|value| !value.is_empty())
    }
}

/// Keep only entries whose key and value are valid UTF-8.
///
/// Skipped entries still reach child processes through normal inheritance.
fn utf8_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                debug!(key = ?key, "Skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Split a `KEY=VALUE` entry on the first `=`, trimming both sides.
pub fn parse_assignment(entry: &str) -> Result<(String, String), CliError> {
    let (key, value) = entry.split_once('=').ok_or_else(|| {
        CliError::ConfigError(format!("Invalid environment override {:?}: expected KEY=VALUE", entry))
    })?;
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::ConfigError(format!(
            "Invalid environment override {:?}: empty key",
            entry
        )));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
