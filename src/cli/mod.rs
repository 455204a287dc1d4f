//! CLI module
//!
//! Provides command-line interface for:
//! - init: Create the data directory and the initial WAL
//! - start: Open the store and serve JSON requests on stdin/stdout
//! - status: Open the store and print its state

mod args;
mod commands;
mod errors;
mod io;
mod request;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, start, status};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use request::{handle, Request, INVALID_REQUEST};
