//! Per-model rate table

use oaistat_core::types::{ModelRates, NormalizedModel};
use std::collections::BTreeMap;

/// Immutable mapping from normalized model to its pricing scheme and rates
#[derive(Debug, Clone, Default)]
pub struct PricingTable {
    version: String,
    rates: BTreeMap<NormalizedModel, ModelRates>,
}

impl PricingTable {
    /// Create a table from already-validated rates
    pub fn new(version: impl Into<String>, rates: BTreeMap<NormalizedModel, ModelRates>) -> Self {
        Self {
            version: version.into(),
            rates,
        }
    }

    /// Snapshot version the rates were taken from
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Rates for a model, if the table prices it
    pub fn get(&self, model: &NormalizedModel) -> Option<&ModelRates> {
        self.rates.get(model)
    }

    /// All priced models in identifier order
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedModel, &ModelRates)> {
        self.rates.iter()
    }

    /// Number of priced models
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the table prices nothing
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
