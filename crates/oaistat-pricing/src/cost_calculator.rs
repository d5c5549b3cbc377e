//! Cost calculator module for computing usage costs
//!
//! Each normalized model is bound to one [`PricingScheme`]; the scheme picks
//! which counters are billed and at which rate:
//!
//! | scheme                | cost                                              |
//! |-----------------------|---------------------------------------------------|
//! | `token_based`         | `context/1000 * input + generated/1000 * output`  |
//! | `unit_cost_per_token` | `(context + generated)/1000 * input`              |
//! | `per_request`         | `requests * input`                                |
//! | `per_second`          | `seconds * input`                                 |
//! | `per_character`       | `characters * input`                              |
//!
//! Models without a table entry, including `other`, cost zero. That is
//! reported through [`PricingStatus`] rather than as an error, since usage
//! data routinely contains models newer than the pricing snapshot.
//!
//! # Examples
//!
//! ```
//! use oaistat_pricing::{cost_calculator::CostCalculator, snapshot::PricingSnapshot};
//! use oaistat_core::types::{NormalizedModel, UsageCounters};
//! use std::sync::Arc;
//!
//! # fn example() -> oaistat_core::Result<()> {
//! let table = Arc::new(PricingSnapshot::embedded()?.table());
//! let calculator = CostCalculator::new(table);
//!
//! let counters = UsageCounters { requests: 3, ..Default::default() };
//! let cost = calculator.calculate_cost(&NormalizedModel::new("dall-e-3-hd"), &counters);
//! assert!((cost - 0.24).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

use crate::pricing_table::PricingTable;
use oaistat_core::types::{ModelRates, NormalizedModel, PricingScheme, PricingStatus, UsageCounters};
use std::sync::Arc;
use tracing::debug;

/// Tokens per pricing unit for token-based schemes
const TOKENS_PER_UNIT: f64 = 1000.0;

/// Cost of one aggregated row together with how it was priced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    /// Cost in the snapshot currency, never negative
    pub cost: f64,
    /// Whether the cost is a real price or a zero fallback
    pub status: PricingStatus,
}

/// Calculates costs from aggregated counters and an injected pricing table
pub struct CostCalculator {
    /// Pricing table instance
    pricing_table: Arc<PricingTable>,
}

impl CostCalculator {
    /// Create a new CostCalculator over a pricing table
    pub fn new(pricing_table: Arc<PricingTable>) -> Self {
        Self { pricing_table }
    }

    /// The table this calculator prices against
    pub fn pricing_table(&self) -> &PricingTable {
        &self.pricing_table
    }

    /// Price counters for a normalized model
    pub fn estimate(&self, model: &NormalizedModel, counters: &UsageCounters) -> CostEstimate {
        if model.is_other() {
            return CostEstimate {
                cost: 0.0,
                status: PricingStatus::Unrecognized,
            };
        }

        match self.pricing_table.get(model) {
            Some(rates) => CostEstimate {
                cost: Self::calculate_from_rates(counters, rates),
                status: if rates.is_complete() {
                    PricingStatus::Priced
                } else {
                    PricingStatus::NoRate
                },
            },
            None => {
                debug!("No pricing entry for {}, costing at 0", model);
                CostEstimate {
                    cost: 0.0,
                    status: PricingStatus::NoRate,
                }
            }
        }
    }

    /// Cost of counters for a normalized model
    pub fn calculate_cost(&self, model: &NormalizedModel, counters: &UsageCounters) -> f64 {
        self.estimate(model, counters).cost
    }

    /// Calculate cost from rates without a table lookup
    ///
    /// This is a pure function; a missing rate contributes nothing.
    pub fn calculate_from_rates(counters: &UsageCounters, rates: &ModelRates) -> f64 {
        let input = rates.input.unwrap_or(0.0);

        let cost = match rates.scheme {
            PricingScheme::TokenBased => {
                let output = rates.output.unwrap_or(0.0);
                (counters.context_tokens as f64 / TOKENS_PER_UNIT) * input
                    + (counters.generated_tokens as f64 / TOKENS_PER_UNIT) * output
            }
            PricingScheme::UnitCostPerToken => {
                (counters.total_tokens() as f64 / TOKENS_PER_UNIT) * input
            }
            PricingScheme::PerRequest => counters.requests as f64 * input,
            PricingScheme::PerSecond => counters.seconds * input,
            PricingScheme::PerCharacter => counters.characters as f64 * input,
        };

        debug!("Calculated cost: ${:.6} under {}", cost, rates.scheme);

        // Rates are validated non-negative on load; seconds are validated by providers
        cost.max(0.0)
    }
}
