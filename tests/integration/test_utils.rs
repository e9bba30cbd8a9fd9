//! Shared test utilities for integration tests
//!
//! Provides isolated XDG directories, executable script fixtures, and a preconfigured
//! `barnstorm` process builder.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static XDG_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Variables that influence resolution and must not leak in from the host
const HOST_VARS: &[&str] = &[
    "Q_PACKAGE_NAMESPACE",
    "Q_FRAMEWORK",
    "Q_PACKAGE_MANAGER",
    "Q_ENV",
    "NODE_ENV",
    "Q_APP_NAME",
    "BARNSTORM_ENV",
    "BARNSTORM_LOG",
    "BARNSTORM_LOG_FORMAT",
    "BARNSTORM_LOG_OUTPUT",
];

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
    barnstorm_env: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
            barnstorm_env: std::env::var("BARNSTORM_ENV").ok(),
        }
    }

    fn restore(self) {
        restore_var("HOME", self.home);
        restore_var("XDG_CONFIG_HOME", self.xdg_config_home);
        restore_var("BARNSTORM_ENV", self.barnstorm_env);
    }
}

fn restore_var(key: &str, value: Option<String>) {
    match value {
        Some(orig) => std::env::set_var(key, orig),
        None => std::env::remove_var(key),
    }
}

/// Run `f` with `XDG_CONFIG_HOME` and `HOME` pointed inside `test_dir`.
///
/// The global config file, if a test wants one, lives at
/// `<test_dir>/barnstorm/config.toml`. Original variables are restored afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = XDG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();

    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());
    std::env::remove_var("BARNSTORM_ENV");

    let result = f();

    env_state.restore();

    result
}

/// Write an executable shell script, creating parent directories.
pub fn write_script(path: &Path, body: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}

/// Local override path for `command` under the default layout.
pub fn local_override(workspace: &Path, command: &str) -> PathBuf {
    workspace.join("bin").join(format!("barnstorm-{}", command))
}

/// Package binary path for `command` under `namespace`.
pub fn package_bin(workspace: &Path, namespace: &str, command: &str) -> PathBuf {
    workspace
        .join("node_modules")
        .join(format!("{}-{}", namespace, command))
}

/// `barnstorm --workspace <workspace>` with config, state and host variables isolated.
pub fn barnstorm(workspace: &Path, sandbox: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_barnstorm"));
    for var in HOST_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", sandbox.join("home"))
        .env("XDG_CONFIG_HOME", sandbox.join("config"))
        .env("XDG_STATE_HOME", sandbox.join("state"))
        .arg("--workspace")
        .arg(workspace);
    cmd
}
