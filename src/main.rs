//! blockledger CLI entry point
//!
//! Parses nothing and opens nothing itself; everything is delegated to
//! `cli::run`. Errors are printed to stderr and mapped to the exit code
//! their kind calls for.

use blockledger::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}
