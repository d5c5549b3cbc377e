//! Common test utilities and helpers for oaistat tests
//!
//! Provides a record builder, a shared pricing snapshot, and helpers to
//! build aggregators and CSV fixtures.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use oaistat::aggregation::Aggregator;
use oaistat_core::timezone::TimezoneConfig;
use oaistat_core::types::{ISOTimestamp, ModelName, UsageCounters, UsageRecord};
use oaistat_pricing::{CostCalculator, PricingSnapshot};
use once_cell::sync::Lazy;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Embedded snapshot, parsed once per test binary
pub static SNAPSHOT: Lazy<PricingSnapshot> =
    Lazy::new(|| PricingSnapshot::embedded().expect("embedded snapshot is valid"));

/// Raw identifiers as they appear in real usage data
pub const TEST_MODELS: &[&str] = &[
    "gpt-4o-2024-08-06",
    "gpt-4o-2024-05-13",
    "gpt-4o-mini-2024-07-18",
    "gpt-4-turbo-2024-04-09",
    "gpt-4-0613",
    "gpt-3.5-turbo-0125",
    "text-embedding-3-small",
    "text-embedding-3-large",
    "dall-e-3",
    "whisper-1",
    "tts-1",
    "tts-1-hd",
    "babbage-002",
];

pub const CSV_HEADER: &str = "model,n_context_tokens_total,n_generated_tokens_total,num_requests,num_characters,num_seconds,timestamp";

/// Midnight UTC on a day in October 2024
pub fn october(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, day, 0, 0, 0).unwrap()
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, day).unwrap()
}

/// Builder for test UsageRecord instances
pub struct UsageRecordBuilder {
    model: String,
    counters: UsageCounters,
    timestamp: DateTime<Utc>,
}

impl UsageRecordBuilder {
    /// One request of gpt-4o on October 1st
    pub fn new() -> Self {
        Self {
            model: TEST_MODELS[0].to_string(),
            counters: UsageCounters {
                requests: 1,
                ..Default::default()
            },
            timestamp: october(1),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.timestamp = ts;
        self
    }

    pub fn with_requests(mut self, requests: u64) -> Self {
        self.counters.requests = requests;
        self
    }

    pub fn with_tokens(mut self, context: u64, generated: u64) -> Self {
        self.counters.context_tokens = context;
        self.counters.generated_tokens = generated;
        self
    }

    pub fn with_characters(mut self, characters: u64) -> Self {
        self.counters.characters = characters;
        self
    }

    pub fn with_seconds(mut self, seconds: f64) -> Self {
        self.counters.seconds = seconds;
        self
    }

    pub fn build(self) -> UsageRecord {
        UsageRecord {
            model: ModelName::new(self.model),
            counters: self.counters,
            timestamp: ISOTimestamp::new(self.timestamp),
        }
    }
}

impl Default for UsageRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregator over the embedded snapshot in UTC
pub fn aggregator() -> Aggregator {
    aggregator_with_tz(TimezoneConfig::default())
}

pub fn aggregator_with_tz(tz: TimezoneConfig) -> Aggregator {
    let (normalizer, table) = SNAPSHOT.clone().into_parts();
    Aggregator::new(
        normalizer,
        Arc::new(CostCalculator::new(Arc::new(table))),
        tz,
    )
}

/// Write CSV rows (without header) to a temp file
pub fn csv_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{CSV_HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
