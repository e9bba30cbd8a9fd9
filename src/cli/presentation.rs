//! CLI presentation: text and json formatters for `--which`.

use crate::command::{CommandDescriptor, Resolution};
use crate::error::CliError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Resolution plus every tier that was considered, in precedence order.
pub fn format_resolution_text(resolution: &Resolution, descriptor: &CommandDescriptor) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}\n\n",
        format!("Command: {}", resolution.name).bold().underline()
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["", "Tier", "Key", "Path"]);
    for source in descriptor.sources() {
        let marker = if source.tier == resolution.tier { "*" } else { "" };
        table.add_row(vec![
            marker.to_string(),
            source.tier.to_string(),
            source.key.clone(),
            source
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    if descriptor.is_remote() {
        out.push_str("Remote-capable: local overrides are not consulted\n");
    }
    out.push_str(&format!(
        "Resolves to {} ({})\n",
        resolution.key, resolution.tier
    ));
    out
}

pub fn format_resolution_json(
    resolution: &Resolution,
    descriptor: &CommandDescriptor,
) -> Result<String, CliError> {
    let searched: Vec<_> = descriptor
        .sources()
        .iter()
        .map(|s| {
            json!({
                "tier": s.tier,
                "key": s.key,
                "path": s.path,
            })
        })
        .collect();
    let value = json!({
        "name": resolution.name,
        "tier": resolution.tier,
        "key": resolution.key,
        "path": resolution.path,
        "remote": descriptor.is_remote(),
        "searched": searched,
    });
    serde_json::to_string_pretty(&value)
        .map_err(|e| CliError::ConfigError(format!("Failed to serialize resolution: {}", e)))
}
