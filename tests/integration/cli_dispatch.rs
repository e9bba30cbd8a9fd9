//! End-to-end dispatch through the `barnstorm` binary.

use crate::integration::test_utils::{barnstorm, local_override, package_bin, write_script};
use std::fs;
use std::process::Output;
use tempfile::TempDir;

struct Sandbox {
    _temp: TempDir,
    root: std::path::PathBuf,
    workspace: std::path::PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        let workspace = root.join("app");
        fs::create_dir_all(&workspace).unwrap();
        fs::create_dir_all(root.join("home")).unwrap();
        Self {
            _temp: temp,
            root,
            workspace,
        }
    }

    fn run(&self, args: &[&str]) -> Output {
        barnstorm(&self.workspace, &self.root)
            .args(args)
            .output()
            .unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[cfg(unix)]
#[test]
fn test_local_override_shadows_builtin() {
    let sb = Sandbox::new();
    write_script(&local_override(&sb.workspace, "help"), "echo local help");

    let output = sb.run(&["help"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "local help");
}

#[cfg(unix)]
#[test]
fn test_package_tier_receives_arguments() {
    let sb = Sandbox::new();
    write_script(
        &package_bin(&sb.workspace, "@barnstorm/cli", "build"),
        "echo \"pkg build $*\"",
    );

    let output = sb.run(&["build", "--prod", "-m", "pwa"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "pkg build --prod -m pwa");
}

#[cfg(unix)]
#[test]
fn test_local_override_beats_package() {
    let sb = Sandbox::new();
    write_script(&local_override(&sb.workspace, "dev"), "echo local");
    write_script(&package_bin(&sb.workspace, "@barnstorm/cli", "dev"), "echo package");

    let output = sb.run(&["dev"]);
    assert_eq!(stdout(&output).trim(), "local");
}

#[cfg(unix)]
#[test]
fn test_remote_command_ignores_local_override() {
    let sb = Sandbox::new();
    write_script(&local_override(&sb.workspace, "test"), "echo local");
    write_script(&package_bin(&sb.workspace, "@barnstorm/cli", "test"), "echo remote");

    let output = sb.run(&["test"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "remote");
}

#[cfg(unix)]
#[test]
fn test_remote_command_with_only_local_override_is_unresolved() {
    let sb = Sandbox::new();
    write_script(&local_override(&sb.workspace, "test"), "echo local");

    let output = sb.run(&["test"]);
    assert_eq!(output.status.code(), Some(127));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("Command not found: test"));
}

#[test]
fn test_missing_command_exits_127() {
    let sb = Sandbox::new();
    let output = sb.run(&["missing-cmd"]);
    assert_eq!(output.status.code(), Some(127));
    assert!(stderr(&output).contains("missing-cmd"));
}

#[cfg(unix)]
#[test]
fn test_child_exit_status_propagates() {
    let sb = Sandbox::new();
    write_script(&local_override(&sb.workspace, "serve"), "exit 3");

    let output = sb.run(&["serve"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("exited with status 3"));
}

#[cfg(unix)]
#[test]
fn test_namespace_from_environment() {
    let sb = Sandbox::new();
    write_script(&package_bin(&sb.workspace, "@acme/tools", "clean"), "echo acme clean");

    let output = barnstorm(&sb.workspace, &sb.root)
        .env("Q_PACKAGE_NAMESPACE", "@acme/tools")
        .arg("clean")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "acme clean");
}

#[cfg(unix)]
#[test]
fn test_overrides_and_dotenv_reach_the_child() {
    let sb = Sandbox::new();
    fs::write(sb.workspace.join(".env"), "Q_APP_NAME=from-dotenv\nQ_APP_SRC_PATH=app\n").unwrap();
    write_script(
        &local_override(&sb.workspace, "info"),
        "echo \"$Q_APP_NAME $Q_APP_SRC_PATH $Q_ENV\"",
    );

    let output = sb.run(&["info"]);
    assert_eq!(stdout(&output).trim(), "from-dotenv app develop");

    let output = sb.run(&["-E", "Q_APP_NAME=cli", "-E", "Q_ENV=production", "info"]);
    assert_eq!(stdout(&output).trim(), "cli app production");
}

#[test]
fn test_malformed_env_override_is_rejected() {
    let sb = Sandbox::new();
    let output = sb.run(&["-E", "NOEQUALS", "help"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("NOEQUALS"));
}

#[cfg(unix)]
#[test]
fn test_which_reports_resolution_without_running() {
    let sb = Sandbox::new();
    write_script(&local_override(&sb.workspace, "build"), "echo should-not-run");

    let output = sb.run(&["--which", "build"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let text = stdout(&output);
    assert!(!text.contains("should-not-run"));
    assert!(text.contains("./bin/barnstorm-build (local-override)"));

    let output = sb.run(&["--which", "--json", "help"]);
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["tier"], "built-in");
    assert_eq!(json["key"], "help");

    let output = sb.run(&["--which", "deploy"]);
    assert_eq!(output.status.code(), Some(127));
}

#[test]
fn test_builtin_help_and_info() {
    let sb = Sandbox::new();

    let output = sb.run(&["help"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Commands"));
    assert!(text.contains("test (remote)"));

    let output = barnstorm(&sb.workspace, &sb.root)
        .env("Q_PACKAGE_MANAGER", "pnpm")
        .args(["info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["package_manager"], "pnpm");
    assert_eq!(json["namespace"], "@barnstorm/cli");
}

#[test]
fn test_no_command_runs_default_task() {
    let sb = Sandbox::new();
    let output = sb.run(&[]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[cfg(unix)]
#[test]
fn test_workspace_config_changes_layout() {
    let sb = Sandbox::new();
    fs::write(
        sb.workspace.join("barnstorm.toml"),
        r#"
[runner]
local_dir = "scripts"
local_prefix = "run"
remote_commands = ["deploy"]
"#,
    )
    .unwrap();
    write_script(&sb.workspace.join("scripts").join("run-build"), "echo scripted");
    write_script(&sb.workspace.join("scripts").join("run-deploy"), "echo local deploy");

    let output = sb.run(&["build"]);
    assert_eq!(stdout(&output).trim(), "scripted");

    let output = sb.run(&["deploy"]);
    assert_eq!(output.status.code(), Some(127));
}

#[cfg(unix)]
#[test]
fn test_non_utf8_process_variable_does_not_abort() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let sb = Sandbox::new();
    let output = barnstorm(&sb.workspace, &sb.root)
        .env("RAW_BYTES", OsStr::from_bytes(b"\xff\xfe"))
        .arg("help")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("Commands"));
}

#[cfg(unix)]
#[test]
fn test_symlinked_override_is_listed_and_runs() {
    let sb = Sandbox::new();
    let target = sb.workspace.join("scripts").join("deploy.sh");
    write_script(&target, "echo deployed");
    fs::create_dir_all(sb.workspace.join("bin")).unwrap();
    std::os::unix::fs::symlink(&target, local_override(&sb.workspace, "deploy")).unwrap();

    let output = sb.run(&["deploy"]);
    assert_eq!(stdout(&output).trim(), "deployed");

    let output = sb.run(&["help", "--json"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let deploy = json
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["name"] == "deploy")
        .expect("deploy should be listed");
    assert_eq!(deploy["resolution"]["tier"], "local-override");
}
