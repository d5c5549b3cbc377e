//! Core types, traits, and utilities for oaistat
//!
//! This crate provides the foundational types, error handling,
//! timezone configuration, and the provider trait used by all
//! other oaistat crates.

pub mod aggregation_types;
pub mod error;
pub mod provider;
pub mod timezone;
pub mod types;

// Re-export commonly used types
pub use error::{OaistatError, Result};
pub use types::{DailyDate, ISOTimestamp, ModelName, NormalizedModel, UsageCounters, UsageRecord};
