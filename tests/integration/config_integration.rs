//! Integration tests for configuration layering and its effect on resolution

use crate::integration::test_utils::{local_override, with_xdg_env, write_script};
use barnstorm::cli::RunContext;
use barnstorm::command::{ResolveLayout, Tier};
use barnstorm::config::ConfigLoader;
use barnstorm::environment::Environment;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_global_and_workspace_files_merge() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::create_dir_all(test_dir.path().join("barnstorm")).unwrap();
    fs::write(
        test_dir.path().join("barnstorm").join("config.toml"),
        r#"
[runner]
packages_dir = "vendor/packages"
remote_commands = ["test", "lint"]

[logging]
level = "info"
"#,
    )
    .unwrap();
    fs::write(
        workspace.join("barnstorm.toml"),
        r#"
[runner]
namespace = "@team/cli"
"#,
    )
    .unwrap();

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.runner.namespace.as_deref(), Some("@team/cli"));
    assert_eq!(config.runner.packages_dir, PathBuf::from("vendor/packages"));
    assert_eq!(config.runner.remote_commands, vec!["test", "lint"]);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_environment_specific_file_overrides_workspace_file() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::write(
        workspace.join("barnstorm.toml"),
        "[runner]\nnamespace = \"@base/cli\"\nlocal_prefix = \"base\"\n",
    )
    .unwrap();
    fs::write(
        workspace.join("config").join("development.toml"),
        "[runner]\nnamespace = \"@dev/cli\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&test_dir, || ConfigLoader::load(&workspace).unwrap());
    assert_eq!(config.runner.namespace.as_deref(), Some("@dev/cli"));
    assert_eq!(config.runner.local_prefix, "base");
}

#[test]
fn test_environment_namespace_beats_config_namespace() {
    let config_toml = "[runner]\nnamespace = \"@config/cli\"\n";
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("barnstorm.toml");
    fs::write(&file, config_toml).unwrap();
    let config = ConfigLoader::load_from_file(&file).unwrap();

    let env = Environment::from_vars([("Q_PACKAGE_NAMESPACE", "@env/cli")]);
    let layout = ResolveLayout::from_config(temp.path(), &config.runner, &env);
    assert_eq!(layout.namespace(), "@env/cli");

    let layout = ResolveLayout::from_config(temp.path(), &config.runner, &Environment::default());
    assert_eq!(layout.namespace(), "@config/cli");
}

#[test]
fn test_configured_remote_command_skips_local_tier() {
    let test_dir = TempDir::new().unwrap();
    let workspace = test_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(
        workspace.join("barnstorm.toml"),
        "[runner]\nremote_commands = [\"test\", \"lint\"]\nexit_on_stop = false\n",
    )
    .unwrap();
    write_script(&local_override(&workspace, "lint"), "echo local");
    write_script(&local_override(&workspace, "build"), "echo local");

    let ctx = with_xdg_env(&test_dir, || RunContext::new(workspace.clone(), None, &[]).unwrap());
    assert!(ctx.registry().resolve("lint").is_err());
    assert_eq!(
        ctx.registry().resolve("build").unwrap().tier,
        Tier::LocalOverride
    );
}

#[test]
fn test_missing_explicit_config_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let result = RunContext::new(
        temp.path().to_path_buf(),
        Some(temp.path().join("absent.toml")),
        &[],
    );
    assert!(result.is_err());
}
