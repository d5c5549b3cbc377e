//! Error types for oaistat
//!
//! This module defines the error types used throughout the oaistat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! Unrecognized models and missing rates are deliberately absent here: they
//! price at zero and are reported through `PricingStatus` instead.
//!
//! # Example
//!
//! ```
//! use oaistat_core::error::{OaistatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to OaistatError
//!     let _file = std::fs::read_to_string("nonexistent.txt")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oaistat operations
#[derive(Error, Debug)]
pub enum OaistatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// No usage records left to report on
    #[error("No usage data found for the requested period")]
    EmptyInput,

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Pricing snapshot failed validation
    #[error("Invalid pricing snapshot: {0}")]
    InvalidPricing(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in oaistat
pub type Result<T> = std::result::Result<T, OaistatError>;
