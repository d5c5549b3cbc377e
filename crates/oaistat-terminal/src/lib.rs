//! Terminal output formatting for oaistat
//!
//! This crate provides table and JSON output formatters for usage
//! reports and pricing snapshots.

pub mod output;

pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
