//! oaistat - Summarize OpenAI API usage and cost
//!
//! This library provides functionality to:
//! - Load usage records from the usage API or a CSV export
//! - Normalize raw model identifiers against a versioned pricing snapshot
//! - Aggregate usage per normalized model and compute costs
//! - Generate reports in table and JSON formats
//!
//! # Examples
//!
//! ```no_run
//! use oaistat::{aggregation::Aggregator, filters::UsageFilter};
//! use oaistat_core::{provider::UsageSource, timezone::TimezoneConfig};
//! use oaistat_pricing::{CostCalculator, PricingSnapshot};
//! use oaistat_provider_csv::DataLoader;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> oaistat_core::Result<()> {
//!     let (normalizer, table) = PricingSnapshot::load(None).await?.into_parts();
//!     let calculator = Arc::new(CostCalculator::new(Arc::new(table)));
//!     let aggregator = Aggregator::new(normalizer, calculator, TimezoneConfig::default());
//!
//!     let records = DataLoader::new("usage.csv").load_all().await?;
//!     let records = UsageFilter::new().apply(records);
//!     let report = aggregator.report(records)?;
//!     println!("Total cost: ${:.2}", report.summary.total_cost);
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod filters;

// Re-export workspace crates for library consumers
pub use oaistat_core::{aggregation_types, error, provider, timezone, types};
pub use oaistat_pricing::{cost_calculator, normalizer, pricing_table, snapshot};
pub use oaistat_terminal::output;

// Re-export commonly used types
pub use oaistat_core::{OaistatError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
