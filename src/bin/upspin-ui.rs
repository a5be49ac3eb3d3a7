//! upspin-ui CLI Binary
//!
//! Command-line interface for browsing and managing an Upspin namespace.

use clap::Parser;
use std::process;
use tracing::{error, info};
use upspin_ui::cli::{Cli, Commands, RunContext};
use upspin_ui::config::ConfigLoader;
use upspin_ui::logging::{init_logging, LoggingConfig};

fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("upspin-ui starting");

    let context = match &cli.command {
        Commands::Init { .. } => RunContext::for_init(cli.config.clone(), cli.store.clone()),
        _ => RunContext::new(cli.config.clone(), cli.user.clone(), cli.store.clone()),
    };
    let context = match context {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error initializing context: {}", e);
            eprintln!("{}", upspin_ui::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", upspin_ui::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args and config file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let loaded = match cli.config {
        Some(ref config_path) => ConfigLoader::load_from_file(config_path),
        None => ConfigLoader::load(),
    };
    let mut config = loaded.map(|c| c.logging).unwrap_or_default();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
        // Surface verbose logs on the terminal unless an output is given below.
        if config.output == "file" {
            config.output = "stderr".to_string();
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
    if config.enabled && config.output == "file" {
        config.file =
            upspin_ui::logging::resolve_log_file_path(cli.log_file.clone(), config.file.clone());
    } else if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }

    config
}
