//! Barnstorm CLI Binary
//!
//! Resolves a command name to a local override, a namespaced package, or a built-in and runs it.

use barnstorm::cli::{Cli, RunContext};
use barnstorm::config::ConfigLoader;
use barnstorm::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Barnstorm CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone(), &cli.env) {
        Ok(ctx) => {
            info!("CLI context initialized");
            ctx
        }
        Err(e) => {
            error!("Error initializing workspace: {}", e);
            eprintln!("{}", barnstorm::cli::map_error(&e));
            process::exit(barnstorm::cli::exit_code(&e));
        }
    };

    if cli.which {
        let Some(name) = cli.command_name() else {
            eprintln!("--which needs a command name");
            process::exit(2);
        };
        match context.which(name, cli.json) {
            Ok(output) => print!("{}", output),
            Err(e) => {
                eprintln!("{}", barnstorm::cli::map_error(&e));
                process::exit(barnstorm::cli::exit_code(&e));
            }
        }
        return;
    }

    let intent = context.execute(cli.argv.clone());
    if !intent.is_success() {
        process::exit(intent.code);
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
        // Verbose output should reach the terminal even when the config logs to a file.
        if config.output == "file" {
            config.output = "file+stderr".to_string();
        }
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }

    let output_uses_file = config.output == "file" || config.output == "file+stderr";
    if config.enabled && output_uses_file {
        let resolved = barnstorm::logging::resolve_log_file_path(
            cli.log_file.clone(),
            config.file.clone(),
            Some(cli.workspace.as_path()),
        );
        if let Ok(path) = resolved {
            config.file = Some(path);
        }
    } else if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
