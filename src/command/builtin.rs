//! Built-in handlers registered at the lowest tier.
//!
//! Both can be shadowed by a local override or an installed package like any other command.

use crate::command::context::InvocationContext;
use crate::command::handler::CommandHandler;
use crate::command::registry::{CommandListing, CommandRegistry};
use crate::environment::EnvScope;
use crate::error::{HandlerError, RegistryError};
use chrono::Utc;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::sync::Arc;

/// Bind `help` and `info` under their bare names (the built-in tier).
pub fn register_builtins(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    registry.bind("help", Arc::new(HelpHandler))?;
    registry.bind("info", Arc::new(InfoHandler))?;
    Ok(())
}

fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn to_json<T: Serialize>(value: &T) -> Result<String, HandlerError> {
    serde_json::to_string_pretty(value).map_err(|e| HandlerError::Other(e.into()))
}

/// `help`: every known command and where it currently resolves
pub struct HelpHandler;

impl CommandHandler for HelpHandler {
    fn start(&self, ctx: &InvocationContext<'_>) -> Result<String, HandlerError> {
        let listing = ctx.registry().list_commands();
        if ctx.flags().is_set("json") {
            return to_json(&listing);
        }
        Ok(format_command_listing(&listing, ctx.registry().layout().namespace()))
    }

    fn describe(&self) -> String {
        "built-in help".to_string()
    }
}

/// Render the command listing as a table.
pub fn format_command_listing(listing: &[CommandListing], namespace: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Commands")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Command", "Summary", "Resolves to"]);
    for row in listing {
        let name = if row.remote {
            format!("{} (remote)", row.name)
        } else {
            row.name.clone()
        };
        let target = match row.resolution {
            Some(ref resolution) => format!("{} ({})", resolution.key, resolution.tier),
            None => "unresolved".to_string(),
        };
        table.add_row(vec![
            name,
            row.summary.clone().unwrap_or_else(|| "-".to_string()),
            target,
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Package namespace: {}\n", namespace));
    out
}

/// Environment and runner report
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentReport {
    pub generated_at: String,
    pub mode: String,
    pub namespace: String,
    pub framework_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    pub app_src_path: String,
    pub workspace_root: String,
    pub local_overrides: String,
    pub variables: Vec<String>,
}

impl EnvironmentReport {
    pub fn collect(registry: &CommandRegistry, scope: EnvScope) -> Self {
        let env = registry.environment();
        let layout = registry.layout();
        Self {
            generated_at: Utc::now().to_rfc3339(),
            mode: env.mode().to_string(),
            namespace: layout.namespace().to_string(),
            framework_mode: layout.framework_mode(),
            package_manager: env.package_manager().map(str::to_string),
            app_name: env.app_name().map(str::to_string),
            app_src_path: env.app_src_path().to_string(),
            workspace_root: layout.workspace_root().display().to_string(),
            local_overrides: layout.local_dir_path().display().to_string(),
            variables: env.list(scope),
        }
    }
}

pub fn format_environment_report(report: &EnvironmentReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Runner")));
    out.push_str(&format!("  Mode:              {}\n", report.mode));
    out.push_str(&format!("  Namespace:         {}\n", report.namespace));
    out.push_str(&format!(
        "  Framework mode:    {}\n",
        if report.framework_mode { "yes" } else { "no" }
    ));
    if let Some(ref pm) = report.package_manager {
        out.push_str(&format!("  Package manager:   {}\n", pm));
    }
    if let Some(ref name) = report.app_name {
        out.push_str(&format!("  App name:          {}\n", name));
    }
    out.push_str(&format!("  App source path:   {}\n", report.app_src_path));
    out.push_str(&format!("  Workspace:         {}\n", report.workspace_root));
    out.push_str(&format!("  Local overrides:   {}\n", report.local_overrides));

    out.push_str(&format!("\n{}\n\n", format_section_heading("Environment")));
    if report.variables.is_empty() {
        out.push_str("  (none)\n");
    }
    for line in &report.variables {
        out.push_str(&format!("  {}\n", line));
    }
    out
}

/// `info`: environment snapshot (`--verbose` adds `HOST_*`, `--all` shows everything)
pub struct InfoHandler;

impl CommandHandler for InfoHandler {
    fn start(&self, ctx: &InvocationContext<'_>) -> Result<String, HandlerError> {
        let flags = ctx.flags();
        let scope = if flags.is_set("all") {
            EnvScope::All
        } else if flags.is_set("verbose") || flags.is_set("v") {
            EnvScope::Verbose
        } else {
            EnvScope::Framework
        };
        let report = EnvironmentReport::collect(ctx.registry(), scope);
        if flags.is_set("json") {
            return to_json(&report);
        }
        Ok(format_environment_report(&report))
    }

    fn describe(&self) -> String {
        "built-in info".to_string()
    }
}
