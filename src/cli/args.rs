//! CLI argument definitions using clap
//!
//! Commands:
//! - paradb init --config <path>
//! - paradb run --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ParaDB - a coordinator/worker sales query engine
#[derive(Parser, Debug)]
#[command(name = "paradb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default cluster configuration file
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./paradb.json")]
        config: PathBuf,
    },

    /// Boot the local cluster and answer queries from stdin
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./paradb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_config() {
        let cli = Cli::try_parse_from(["paradb", "run", "--config", "/tmp/c.json"]).unwrap();
        match cli.command {
            Command::Run { config } => assert_eq!(config, PathBuf::from("/tmp/c.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_init_default_path() {
        let cli = Cli::try_parse_from(["paradb", "init"]).unwrap();
        match cli.command {
            Command::Init { config } => assert_eq!(config, PathBuf::from("./paradb.json")),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
