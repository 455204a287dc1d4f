//! CLI argument definitions using clap
//!
//! Commands:
//! - blockledger init --config <path>
//! - blockledger start --config <path>
//! - blockledger status --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// blockledger - a crash-consistent ledger store
#[derive(Parser, Debug)]
#[command(name = "blockledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./blockledger.json")]
        config: PathBuf,
    },

    /// Open the store and serve JSON requests from stdin
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./blockledger.json")]
        config: PathBuf,
    },

    /// Open the store, print its state and exit
    Status {
        /// Path to configuration file
        #[arg(long, default_value = "./blockledger.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
