//! Pricing snapshot, model normalizer, and cost calculator for oaistat
//!
//! This crate loads the versioned pricing snapshot (embedded or from a
//! user file), classifies raw model names, and prices aggregated usage.

pub mod cost_calculator;
pub mod normalizer;
pub mod pricing_table;
pub mod snapshot;

pub use cost_calculator::{CostCalculator, CostEstimate};
pub use normalizer::{ModelNormalizer, NormalizationRule};
pub use pricing_table::PricingTable;
pub use snapshot::PricingSnapshot;
