//! Aggregation data types for oaistat
//!
//! Pure data structures used for aggregated usage summaries.
//! These types have no dependencies on the cost calculator or providers.

use crate::types::{DateSpan, NormalizedModel, PricingStatus, UsageCounters};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Usage summed over every record of one normalized model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Normalized model identifier
    pub model: NormalizedModel,
    /// Summed counters
    pub counters: UsageCounters,
    /// First and last calendar day this model was seen
    pub span: DateSpan,
    /// Total cost in USD
    pub total_cost: f64,
    /// How the cost was determined
    pub pricing_status: PricingStatus,
    /// Inclusive days between first and last use, at least 1
    pub active_days: u64,
    /// Requests divided by active days
    pub daily_average_calls: f64,
    /// Cost divided by active days
    pub daily_average_cost: f64,
}

impl ModelUsage {
    /// Build a row from its summed counters and computed cost
    pub fn new(
        model: NormalizedModel,
        counters: UsageCounters,
        span: DateSpan,
        total_cost: f64,
        pricing_status: PricingStatus,
    ) -> Self {
        let active_days = span.active_days();
        Self {
            model,
            counters,
            span,
            total_cost,
            pricing_status,
            active_days,
            daily_average_calls: counters.requests as f64 / active_days as f64,
            daily_average_cost: total_cost / active_days as f64,
        }
    }

    /// Whether the cost is a real price rather than a zero fallback
    pub fn is_priced(&self) -> bool {
        self.pricing_status == PricingStatus::Priced
    }
}

/// Per-model rows plus the overall date span, as produced by the aggregator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedUsage {
    /// One row per normalized model present in the input
    pub models: Vec<ModelUsage>,
    /// Earliest to latest date across all records
    pub span: DateSpan,
}

/// Overall totals and daily averages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Total API calls
    pub total_calls: u64,
    /// Total cost in USD
    pub total_cost: f64,
    /// Overall date span
    pub span: DateSpan,
    /// Inclusive days in the overall span
    pub active_days: u64,
    /// Total calls divided by active days
    pub daily_average_calls: f64,
    /// Total cost divided by active days
    pub daily_average_cost: f64,
}

impl Summary {
    /// Derive totals from aggregated rows and the overall span
    pub fn from_models(models: &[ModelUsage], span: DateSpan) -> Self {
        let mut total_calls = 0u64;
        let mut total_cost = 0.0;
        for row in models {
            total_calls = total_calls.saturating_add(row.counters.requests);
            total_cost += row.total_cost;
        }

        let active_days = span.active_days();
        Self {
            total_calls,
            total_cost,
            span,
            active_days,
            daily_average_calls: total_calls as f64 / active_days as f64,
            daily_average_cost: total_cost / active_days as f64,
        }
    }
}

/// Complete report handed to the formatters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// Version of the pricing snapshot used for costs
    pub pricing_version: String,
    /// Overall totals
    pub summary: Summary,
    /// Per-model rows
    pub models: Vec<ModelUsage>,
}

impl UsageReport {
    /// Build a report from aggregated usage
    pub fn new(pricing_version: impl Into<String>, aggregated: AggregatedUsage) -> Self {
        let summary = Summary::from_models(&aggregated.models, aggregated.span);
        Self {
            pricing_version: pricing_version.into(),
            summary,
            models: aggregated.models,
        }
    }

    /// Rows whose cost fell back to zero
    pub fn unpriced_models(&self) -> impl Iterator<Item = &ModelUsage> {
        self.models.iter().filter(|row| !row.is_priced())
    }

    /// Reorder rows for display
    pub fn sort_models(&mut self, key: SortKey) {
        match key {
            SortKey::Model => self.models.sort_by(|a, b| a.model.cmp(&b.model)),
            SortKey::Cost => self.models.sort_by(|a, b| {
                b.total_cost
                    .total_cmp(&a.total_cost)
                    .then_with(|| a.model.cmp(&b.model))
            }),
            SortKey::Calls => self.models.sort_by(|a, b| {
                b.counters
                    .requests
                    .cmp(&a.counters.requests)
                    .then_with(|| a.model.cmp(&b.model))
            }),
        }
    }
}

/// Display ordering for per-model rows
///
/// # Examples
/// ```
/// use oaistat_core::aggregation_types::SortKey;
/// use std::str::FromStr;
///
/// assert_eq!(SortKey::from_str("cost").unwrap(), SortKey::Cost);
/// assert_eq!(SortKey::Calls.to_string(), "calls");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Alphabetical by normalized model
    #[default]
    Model,
    /// Most expensive first
    Cost,
    /// Most requests first
    Calls,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Cost => write!(f, "cost"),
            Self::Calls => write!(f, "calls"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "cost" => Ok(Self::Cost),
            "calls" => Ok(Self::Calls),
            _ => Err(format!("Invalid sort key: {s}")),
        }
    }
}
