//! Aggregation module for summarizing usage data
//!
//! Raw usage records are folded into one row per normalized model. Each
//! row sums its counters and tracks the first and last calendar day it was
//! seen; the overall span is tracked separately so a model used only
//! mid-period does not shrink it. The fold is order independent, so any
//! permutation of the input yields identical rows.
//!
//! Costs are computed once per row, after summing, against the injected
//! pricing table.
//!
//! # Examples
//!
//! ```
//! use oaistat::aggregation::Aggregator;
//! use oaistat_core::timezone::TimezoneConfig;
//! use oaistat_core::types::{ISOTimestamp, ModelName, UsageCounters, UsageRecord};
//! use oaistat_pricing::{CostCalculator, PricingSnapshot};
//! use std::sync::Arc;
//!
//! # fn example() -> oaistat_core::Result<()> {
//! let (normalizer, table) = PricingSnapshot::embedded()?.into_parts();
//! let aggregator = Aggregator::new(
//!     normalizer,
//!     Arc::new(CostCalculator::new(Arc::new(table))),
//!     TimezoneConfig::default(),
//! );
//!
//! let record = UsageRecord {
//!     model: ModelName::new("gpt-4o-2024-08-06"),
//!     counters: UsageCounters {
//!         requests: 1,
//!         context_tokens: 1000,
//!         generated_tokens: 500,
//!         ..Default::default()
//!     },
//!     timestamp: ISOTimestamp::from_unix_seconds(1_727_827_200)?,
//! };
//!
//! let usage = aggregator.aggregate(vec![record])?;
//! assert_eq!(usage.models[0].model.as_str(), "gpt-4o-08-06");
//! assert!((usage.models[0].total_cost - 0.0075).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```

use oaistat_core::aggregation_types::{AggregatedUsage, ModelUsage, UsageReport};
use oaistat_core::error::{OaistatError, Result};
use oaistat_core::timezone::TimezoneConfig;
use oaistat_core::types::{DailyDate, DateSpan, NormalizedModel, UsageCounters, UsageRecord};
use oaistat_pricing::{CostCalculator, ModelNormalizer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Running totals for one normalized model
struct ModelAccumulator {
    counters: UsageCounters,
    span: DateSpan,
}

impl ModelAccumulator {
    fn new(date: DailyDate) -> Self {
        Self {
            counters: UsageCounters::default(),
            span: DateSpan::single(date),
        }
    }

    fn add_record(&mut self, record: &UsageRecord, date: DailyDate) {
        self.counters += record.counters;
        self.span.include(date);
    }
}

/// Main aggregator for usage records
pub struct Aggregator {
    normalizer: ModelNormalizer,
    cost_calculator: Arc<CostCalculator>,
    timezone_config: TimezoneConfig,
}

impl Aggregator {
    /// Create a new Aggregator
    pub fn new(
        normalizer: ModelNormalizer,
        cost_calculator: Arc<CostCalculator>,
        timezone_config: TimezoneConfig,
    ) -> Self {
        Self {
            normalizer,
            cost_calculator,
            timezone_config,
        }
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.timezone_config
    }

    /// Fold records into per-model rows plus the overall span
    ///
    /// Rows come back ordered by normalized model. Returns
    /// [`OaistatError::EmptyInput`] when there are no records.
    pub fn aggregate(
        &self,
        records: impl IntoIterator<Item = UsageRecord>,
    ) -> Result<AggregatedUsage> {
        let mut model_map: BTreeMap<NormalizedModel, ModelAccumulator> = BTreeMap::new();
        let mut overall: Option<DateSpan> = None;
        let mut count = 0u64;

        for record in records {
            let date = DailyDate::from_timestamp_with_tz(&record.timestamp, &self.timezone_config.tz);
            let model = self.normalizer.normalize(record.model.as_str());
            if model.is_other() {
                debug!("Unrecognized model '{}', grouping as {}", record.model, model);
            }

            model_map
                .entry(model)
                .or_insert_with(|| ModelAccumulator::new(date))
                .add_record(&record, date);

            match overall.as_mut() {
                Some(span) => span.include(date),
                None => overall = Some(DateSpan::single(date)),
            }
            count += 1;
        }

        let span = overall.ok_or(OaistatError::EmptyInput)?;

        let models: Vec<ModelUsage> = model_map
            .into_iter()
            .map(|(model, acc)| {
                let estimate = self.cost_calculator.estimate(&model, &acc.counters);
                ModelUsage::new(model, acc.counters, acc.span, estimate.cost, estimate.status)
            })
            .collect();

        info!(
            "Aggregated {} records into {} models over {} days",
            count,
            models.len(),
            span.active_days()
        );

        Ok(AggregatedUsage { models, span })
    }

    /// Aggregate and derive the summary in one step
    pub fn report(&self, records: impl IntoIterator<Item = UsageRecord>) -> Result<UsageReport> {
        let aggregated = self.aggregate(records)?;
        Ok(UsageReport::new(
            self.cost_calculator.pricing_table().version(),
            aggregated,
        ))
    }
}
