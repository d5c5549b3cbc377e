//! Pricing snapshot loading
//!
//! A pricing snapshot is a versioned JSON document holding both the
//! normalization ruleset and the per-model rate table. Vendors add models
//! and change prices faster than releases ship, so the snapshot is data:
//! an embedded default is compiled in, and a user file can replace it
//! without touching the normalizer or aggregator.
//!
//! Resolution order for [`PricingSnapshot::load`]:
//! 1. an explicit path (the `--pricing` flag)
//! 2. the `OAISTAT_PRICING` environment variable
//! 3. `<config dir>/oaistat/pricing.json`, if it exists
//! 4. the embedded snapshot

use crate::normalizer::{ModelNormalizer, NormalizationRule};
use crate::pricing_table::PricingTable;
use oaistat_core::error::{OaistatError, Result};
use oaistat_core::types::{ModelRates, NormalizedModel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Embedded pricing snapshot used when no override is configured
const EMBEDDED_PRICING: &str = include_str!("../embedded/pricing.json");

/// Environment variable naming a pricing snapshot file
pub const PRICING_ENV_VAR: &str = "OAISTAT_PRICING";

/// Versioned ruleset plus rate table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSnapshot {
    /// Date or label identifying when the prices were taken
    pub version: String,
    /// Currency the rates are quoted in
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Normalization rules in evaluation order
    pub rules: Vec<NormalizationRule>,
    /// Rates keyed by normalized model
    pub models: BTreeMap<NormalizedModel, ModelRates>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl PricingSnapshot {
    /// Parse and validate the embedded snapshot
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(EMBEDDED_PRICING)
    }

    /// Parse and validate a snapshot from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Read, parse, and validate a snapshot file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let snapshot: Self =
            serde_json::from_str(&content).map_err(|e| OaistatError::Parse {
                file: path.to_path_buf(),
                error: e.to_string(),
            })?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Resolve and load the active snapshot
    pub async fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Using pricing snapshot from {}", path.display());
            return Self::from_file(path).await;
        }

        if let Ok(path) = std::env::var(PRICING_ENV_VAR) {
            if !path.is_empty() {
                info!("Using pricing snapshot from ${PRICING_ENV_VAR}: {path}");
                return Self::from_file(Path::new(&path)).await;
            }
        }

        if let Some(path) = default_snapshot_path() {
            if path.exists() {
                info!("Using pricing snapshot from {}", path.display());
                return Self::from_file(&path).await;
            }
            debug!("No pricing snapshot at {}", path.display());
        }

        let snapshot = Self::embedded()?;
        info!("Using embedded pricing snapshot {}", snapshot.version);
        Ok(snapshot)
    }

    /// Check the invariants the cost calculator relies on
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(OaistatError::InvalidPricing("version is empty".into()));
        }

        for (index, rule) in self.rules.iter().enumerate() {
            if rule.all_of.is_empty() || rule.all_of.iter().any(|s| s.is_empty()) {
                return Err(OaistatError::InvalidPricing(format!(
                    "rule {} for '{}' needs at least one non-empty pattern",
                    index + 1,
                    rule.model
                )));
            }
            if rule.model.is_other() {
                return Err(OaistatError::InvalidPricing(format!(
                    "rule {} targets the reserved model '{}'",
                    index + 1,
                    NormalizedModel::OTHER
                )));
            }
        }

        for (model, rates) in &self.models {
            if model.is_other() {
                return Err(OaistatError::InvalidPricing(format!(
                    "the reserved model '{}' cannot be priced",
                    NormalizedModel::OTHER
                )));
            }
            for (name, rate) in [("input", rates.input), ("output", rates.output)] {
                if let Some(rate) = rate {
                    if !rate.is_finite() || rate < 0.0 {
                        return Err(OaistatError::InvalidPricing(format!(
                            "{name} rate for '{model}' must be a non-negative number, got {rate}"
                        )));
                    }
                }
            }
            if !rates.is_complete() {
                warn!(
                    "Pricing for '{}' ({}) is missing a rate; that component will cost 0",
                    model, rates.scheme
                );
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !self.models.contains_key(&rule.model) && seen.insert(&rule.model) {
                warn!(
                    "Normalized model '{}' has no pricing entry; its usage will cost 0",
                    rule.model
                );
            }
        }

        Ok(())
    }

    /// Build the normalizer for this snapshot's ruleset
    pub fn normalizer(&self) -> ModelNormalizer {
        ModelNormalizer::new(self.rules.clone())
    }

    /// Build the rate table for this snapshot
    pub fn table(&self) -> PricingTable {
        PricingTable::new(self.version.clone(), self.models.clone())
    }

    /// Consume the snapshot into its normalizer and table
    pub fn into_parts(self) -> (ModelNormalizer, PricingTable) {
        (
            ModelNormalizer::new(self.rules),
            PricingTable::new(self.version, self.models),
        )
    }
}

/// `<config dir>/oaistat/pricing.json`
pub fn default_snapshot_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("oaistat").join("pricing.json"))
}
