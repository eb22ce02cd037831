//! cds-explorer CLI Binary
//!
//! Command-line host for the CDS explorer tree.

use cds_explorer::cli::{Cli, RunContext};
use cds_explorer::config::{ConfigLoader, ExplorerConfig};
use cds_explorer::error::ExplorerError;
use cds_explorer::logging::{init_logging, LoggingConfig};
use clap::Parser;
use std::io::IsTerminal;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    // Settings failures are reported after logging is up
    let loaded = ConfigLoader::load(cli.config.as_deref());
    let base_logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();

    let logging_config = build_logging_config(&cli, base_logging);
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("cds-explorer starting");

    let config = match loaded {
        Ok(config) => apply_overrides(&cli, config),
        Err(e) => {
            let e = ExplorerError::from(e);
            error!("Error loading settings: {}", e);
            eprintln!("{}", cds_explorer::cli::map_error(&e));
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            process::exit(1);
        }
    };

    let context = RunContext::new(config).with_color(std::io::stdout().is_terminal());
    match runtime.block_on(context.execute(&cli.command)) {
        Ok(output) => {
            info!("Command completed successfully");
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", cds_explorer::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Flags override the settings files.
fn apply_overrides(cli: &Cli, mut config: ExplorerConfig) -> ExplorerConfig {
    if !cli.cdsrcs.is_empty() {
        config.cdsrcs = cli.cdsrcs.clone();
    }
    if let Some(ref binary) = cli.cdsctl {
        config.cdsctl.binary = binary.clone();
    }
    config
}

/// Build logging configuration from CLI args on top of the settings file.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, mut config: LoggingConfig) -> LoggingConfig {
    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
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
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
    }
    config
}
