//! CLI command implementations
//!
//! Every command loads the configuration first. `start` and `status` open
//! the store, which runs recovery before anything else happens.

use std::io;
use std::path::Path;

use serde_json::json;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{error_response, ok_response, read_request_lines, write_line, write_response};
use super::request::{handle, Request, INVALID_REQUEST};
use crate::config::LedgerConfig;
use crate::observability::{LogOutput, Logger};
use crate::store::LedgerStore;
use crate::wal::WAL_FILE;

/// Parse arguments and run the selected command
///
/// stdout carries only JSON responses, so logs are sent to stderr.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    Logger::set_output(LogOutput::StderrOnly);
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
        Command::Status { config } => status(&config),
    }
}

/// Initialize a new data directory
///
/// Creates the directory and the initial WAL (pointer `1`).
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = LedgerConfig::load(config_path)?;

    if is_initialized(config.data_path()) {
        return Err(CliError::already_initialized(config.data_path()));
    }

    let store = LedgerStore::open(config)?;

    write_response(json!({
        "initialized": true,
        "data_dir": store.data_dir().display().to_string(),
        "block_size": store.block_size(),
    }))
}

/// Open the store and serve requests
///
/// Reads one JSON request per line from stdin and writes one JSON
/// response per line to stdout. A line that is not a valid request gets
/// an error response and serving continues.
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = LedgerConfig::load(config_path)?;

    if !is_initialized(config.data_path()) {
        return Err(CliError::not_initialized(config.data_path()));
    }

    let mut store = LedgerStore::open(config)?;

    let mut stdout = io::stdout();
    for line in read_request_lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                // stdin is gone; nothing more to serve
                write_line(&mut stdout, &error_response(e.code_str(), e.message()))?;
                break;
            }
        };

        let response = match Request::parse(&line) {
            Ok(request) => match handle(&mut store, &request) {
                Ok(data) => ok_response(data),
                Err(e) => error_response(e.code(), &e.message()),
            },
            Err(e) => error_response(INVALID_REQUEST, &e.to_string()),
        };
        write_line(&mut stdout, &response)?;
    }

    Ok(())
}

/// Open the store, print its state and exit
pub fn status(config_path: &Path) -> CliResult<()> {
    let config = LedgerConfig::load(config_path)?;

    if !is_initialized(config.data_path()) {
        return Err(CliError::not_initialized(config.data_path()));
    }

    let store = LedgerStore::open(config)?;
    let report = store.recovery_report();

    write_response(json!({
        "next_block_id": store.next_block_id(),
        "pending": store.pending_record_count(),
        "accounts": store.balances().len(),
        "block_size": store.block_size(),
        "repaired": report.repaired(),
    }))
}

fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join(WAL_FILE).exists()
}
