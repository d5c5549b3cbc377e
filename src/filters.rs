//! Filtering module for usage records
//!
//! Restricts records to an inclusive range of calendar days, evaluated in
//! the configured timezone so filtering and aggregation agree on which day
//! a record belongs to.
//!
//! # Examples
//!
//! ```
//! use oaistat::filters::UsageFilter;
//! use chrono::NaiveDate;
//!
//! // Only October 2024
//! let filter = UsageFilter::new()
//!     .with_since(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap())
//!     .with_until(NaiveDate::from_ymd_opt(2024, 10, 31).unwrap());
//! assert!(!filter.is_empty());
//! ```

use chrono::NaiveDate;
use oaistat_core::error::{OaistatError, Result};
use oaistat_core::timezone::TimezoneConfig;
use oaistat_core::types::{DailyDate, UsageRecord};
use tracing::debug;

/// Filter configuration for usage records
#[derive(Debug, Default, Clone)]
pub struct UsageFilter {
    /// Start date filter (inclusive)
    pub since_date: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub until_date: Option<NaiveDate>,
    /// Timezone used to find a record's calendar day
    pub timezone_config: TimezoneConfig,
}

impl UsageFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Set the timezone used for calendar days
    pub fn with_timezone(mut self, timezone_config: TimezoneConfig) -> Self {
        self.timezone_config = timezone_config;
        self
    }

    /// Whether the filter lets everything through
    pub fn is_empty(&self) -> bool {
        self.since_date.is_none() && self.until_date.is_none()
    }

    /// Reject a range whose end precedes its start
    pub fn validate(&self) -> Result<()> {
        if let (Some(since), Some(until)) = (self.since_date, self.until_date) {
            if until < since {
                return Err(OaistatError::InvalidArgument(format!(
                    "--until {until} is before --since {since}"
                )));
            }
        }
        Ok(())
    }

    /// Check if a record passes the filter
    pub fn matches(&self, record: &UsageRecord) -> bool {
        let daily_date = DailyDate::from_timestamp_with_tz(&record.timestamp, &self.timezone_config.tz);
        let record_date = daily_date.inner();

        if let Some(since) = &self.since_date {
            if record_date < since {
                return false;
            }
        }

        if let Some(until) = &self.until_date {
            if record_date > until {
                return false;
            }
        }

        true
    }

    /// Keep only matching records
    pub fn apply(&self, records: Vec<UsageRecord>) -> Vec<UsageRecord> {
        if self.is_empty() {
            return records;
        }

        let before = records.len();
        let kept: Vec<_> = records.into_iter().filter(|r| self.matches(r)).collect();
        debug!("Date filter kept {} of {} records", kept.len(), before);
        kept
    }
}

/// Parse a `YYYY-MM-DD` command-line date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        OaistatError::InvalidDate(format!("'{s}', expected YYYY-MM-DD"))
    })
}
