//! CLI module for ParaDB
//!
//! Provides command-line interface for:
//! - init: Write a default cluster configuration
//! - run: Boot the local cluster and serve queries from stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_cluster, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{operator_frontend, write_error};
