//! Crash testing framework for blockledger
//!
//! This module provides:
//! - Crash injection at named points via `BLOCKLEDGER_CRASH_POINT`
//! - Subprocess management
//! - Post-crash validation

pub mod harness;
pub mod scenarios;
pub mod utils;

pub use harness::*;
pub use utils::*;

// Integration tests run via `cargo test --test crash_tests`
