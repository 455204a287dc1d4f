//! Observability subsystem
//!
//! Structured JSON logging of lifecycle, WAL, compaction and recovery
//! events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on execution
//! 3. No async or background threads
//!
//! # Usage
//!
//! ```ignore
//! use blockledger::observability::{log_event_with_fields, Event, Logger};
//!
//! log_event_with_fields(Event::RecoveryComplete, &[("next_block_id", "3")]);
//! Logger::warn("SOMETHING_ODD", &[("detail", "x")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{LogOutput, Logger, Severity};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
