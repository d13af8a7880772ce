//! CLI command implementations

use std::path::Path;

use crate::cluster::{generate_tables, launch, ClusterConfig, ClusterReport};
use crate::frontend::Frontend;
use crate::observability::{log_event_with_fields, Event, Logger};
use crate::topology::ROOT_RANK;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{operator_frontend, write_error};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Run { config } => {
            let mut frontend = operator_frontend();
            match run_cluster(&config, &mut frontend) {
                Ok(_) => Ok(()),
                Err(e) => {
                    // Best effort
                    let _ = write_error(e.code_str(), e.message());
                    Err(e)
                }
            }
        }
    }
}

/// Write a default configuration file
///
/// Fails if the file already exists.
pub fn init(config_path: &Path) -> CliResult<()> {
    ClusterConfig::default().save_new(config_path)?;
    Logger::info(
        "CONFIG_WRITTEN",
        &[("path", &config_path.display().to_string())],
    );
    Ok(())
}

/// Load the configuration, generate worker data and serve `frontend`
/// until EXIT.
pub fn run_cluster(config_path: &Path, frontend: &mut dyn Frontend) -> CliResult<ClusterReport> {
    let config = ClusterConfig::load(config_path)?;
    Logger::set_threshold(config.log_threshold());
    log_event_with_fields(
        Event::ConfigLoaded,
        ROOT_RANK,
        &[
            ("coordinators", &config.coordinators.to_string()),
            ("path", &config_path.display().to_string()),
        ],
    );

    let tables = generate_tables(&config);
    let report = launch(&config, tables, frontend)?;

    let summary = serde_json::to_string(&report)
        .map_err(|e| CliError::io_error(format!("JSON error: {}", e)))?;
    Logger::info("CLUSTER_REPORT", &[("report", &summary)]);

    Ok(report)
}
