//! Core domain types for oaistat
//!
//! This module contains the fundamental types used throughout the oaistat library.
//! These types provide strong typing for raw and normalized model names,
//! timestamps, calendar dates, usage counters, and pricing rates.

use crate::error::{OaistatError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// Raw, vendor-supplied model or snapshot identifier
///
/// # Examples
/// ```
/// use oaistat_core::types::ModelName;
///
/// let model = ModelName::new("gpt-4o-2024-08-06");
/// assert_eq!(model.as_str(), "gpt-4o-2024-08-06");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelName(String);

impl ModelName {
    /// Create a new ModelName from any string-like type
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical identifier a family of raw model names collapses to
///
/// The set of identifiers is defined by the loaded pricing snapshot; the
/// only identifier known ahead of time is the catch-all [`NormalizedModel::OTHER`].
///
/// # Examples
/// ```
/// use oaistat_core::types::NormalizedModel;
///
/// let other = NormalizedModel::other();
/// assert!(other.is_other());
/// assert!(!NormalizedModel::new("gpt-4o-mini").is_other());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedModel(String);

impl NormalizedModel {
    /// Identifier assigned to raw names that match no rule
    pub const OTHER: &'static str = "other";

    /// Create a new NormalizedModel
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The catch-all model
    pub fn other() -> Self {
        Self(Self::OTHER.to_string())
    }

    /// Whether this is the catch-all model
    pub fn is_other(&self) -> bool {
        self.0 == Self::OTHER
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NormalizedModel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// ISO timestamp wrapper for UTC timestamps
///
/// # Examples
/// ```
/// use oaistat_core::types::ISOTimestamp;
///
/// let ts = ISOTimestamp::from_unix_seconds(1_727_827_200).unwrap();
/// assert_eq!(ts.to_daily_date().format("%Y-%m-%d"), "2024-10-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ISOTimestamp(DateTime<Utc>);

impl ISOTimestamp {
    /// Create a new ISOTimestamp
    pub fn new(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Create from whole seconds since the Unix epoch
    pub fn from_unix_seconds(secs: i64) -> Result<Self> {
        DateTime::from_timestamp(secs, 0)
            .map(Self)
            .ok_or_else(|| OaistatError::InvalidDate(format!("timestamp out of range: {secs}")))
    }

    /// Create from possibly fractional seconds since the Unix epoch
    pub fn from_unix_seconds_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() {
            return Err(OaistatError::InvalidDate(format!(
                "timestamp is not a finite number: {secs}"
            )));
        }
        let whole = secs.floor();
        let nanos = ((secs - whole) * 1_000_000_000.0).round().min(999_999_999.0) as u32;
        DateTime::from_timestamp(whole as i64, nanos)
            .map(Self)
            .ok_or_else(|| OaistatError::InvalidDate(format!("timestamp out of range: {secs}")))
    }

    /// Get the inner DateTime
    pub fn inner(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Convert to DailyDate using UTC
    pub fn to_daily_date(&self) -> DailyDate {
        DailyDate::new(self.0.date_naive())
    }

    /// Convert to DailyDate using specified timezone
    pub fn to_daily_date_with_tz(&self, tz: &Tz) -> DailyDate {
        DailyDate::new(self.0.with_timezone(tz).date_naive())
    }
}

impl AsRef<DateTime<Utc>> for ISOTimestamp {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}

/// Calendar date used for active-day accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Create from a timestamp using specified timezone
    pub fn from_timestamp_with_tz(ts: &ISOTimestamp, tz: &Tz) -> Self {
        ts.to_daily_date_with_tz(tz)
    }

    /// Whole calendar days from `self` to `later` (negative if `later` is earlier)
    pub fn days_until(&self, later: &DailyDate) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Inclusive range of calendar days covered by a set of records
///
/// # Examples
/// ```
/// use oaistat_core::types::{DailyDate, DateSpan};
/// use chrono::NaiveDate;
///
/// let first = DailyDate::new(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap());
/// let mut span = DateSpan::single(first);
/// assert_eq!(span.active_days(), 1);
///
/// span.include(DailyDate::new(NaiveDate::from_ymd_opt(2024, 10, 3).unwrap()));
/// assert_eq!(span.active_days(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    /// Earliest observed date
    pub start: DailyDate,
    /// Latest observed date
    pub end: DailyDate,
}

impl DateSpan {
    /// A span covering exactly one day
    pub fn single(date: DailyDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// Widen the span to cover `date`
    pub fn include(&mut self, date: DailyDate) {
        if date < self.start {
            self.start = date;
        }
        if date > self.end {
            self.end = date;
        }
    }

    /// Smallest span covering both spans
    pub fn merge(&self, other: &DateSpan) -> DateSpan {
        DateSpan {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Inclusive number of calendar days, never less than 1
    pub fn active_days(&self) -> u64 {
        (self.start.days_until(&self.end) + 1).max(1) as u64
    }
}

/// Usage counters carried by a record and summed during aggregation
///
/// # Examples
/// ```
/// use oaistat_core::types::UsageCounters;
///
/// let a = UsageCounters { requests: 1, context_tokens: 100, generated_tokens: 50, ..Default::default() };
/// let b = UsageCounters { requests: 2, seconds: 30.0, ..Default::default() };
/// let sum = a + b;
/// assert_eq!(sum.requests, 3);
/// assert_eq!(sum.total_tokens(), 150);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageCounters {
    /// Number of API calls
    pub requests: u64,
    /// Context (input) tokens
    pub context_tokens: u64,
    /// Generated (output) tokens
    pub generated_tokens: u64,
    /// Characters synthesized (speech)
    pub characters: u64,
    /// Audio seconds transcribed
    pub seconds: f64,
}

impl UsageCounters {
    /// Context plus generated tokens
    pub fn total_tokens(&self) -> u64 {
        self.context_tokens.saturating_add(self.generated_tokens)
    }
}

impl Add for UsageCounters {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for UsageCounters {
    // Counts saturate at u64::MAX rather than wrap
    fn add_assign(&mut self, other: Self) {
        self.requests = self.requests.saturating_add(other.requests);
        self.context_tokens = self.context_tokens.saturating_add(other.context_tokens);
        self.generated_tokens = self.generated_tokens.saturating_add(other.generated_tokens);
        self.characters = self.characters.saturating_add(other.characters);
        self.seconds += other.seconds;
    }
}

/// One raw usage observation as supplied by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Raw model identifier
    pub model: ModelName,
    /// Counters for this observation
    pub counters: UsageCounters,
    /// When the usage was recorded
    pub timestamp: ISOTimestamp,
}

/// How a normalized model's cost is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingScheme {
    /// Separate input and output rates per 1000 tokens
    TokenBased,
    /// One rate per 1000 tokens over context plus generated tokens
    UnitCostPerToken,
    /// Flat rate per request
    PerRequest,
    /// Rate per second of audio
    PerSecond,
    /// Rate per synthesized character
    PerCharacter,
}

impl fmt::Display for PricingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenBased => write!(f, "token_based"),
            Self::UnitCostPerToken => write!(f, "unit_cost_per_token"),
            Self::PerRequest => write!(f, "per_request"),
            Self::PerSecond => write!(f, "per_second"),
            Self::PerCharacter => write!(f, "per_character"),
        }
    }
}

/// Rates for one normalized model, in currency per unit
///
/// `input` is the primary rate for every scheme; `output` is only read by
/// [`PricingScheme::TokenBased`]. A missing rate prices its component at zero.
///
/// # Examples
/// ```
/// use oaistat_core::types::{ModelRates, PricingScheme};
///
/// let rates = ModelRates {
///     scheme: PricingScheme::TokenBased,
///     input: Some(0.0025),  // $2.50 per 1M context tokens
///     output: Some(0.0100), // $10.00 per 1M generated tokens
/// };
/// assert!(rates.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRates {
    /// Formula used for this model
    pub scheme: PricingScheme,
    /// Primary rate
    #[serde(default)]
    pub input: Option<f64>,
    /// Output-token rate (token-based models only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<f64>,
}

impl ModelRates {
    /// Whether every rate the scheme reads is present
    pub fn is_complete(&self) -> bool {
        match self.scheme {
            PricingScheme::TokenBased => self.input.is_some() && self.output.is_some(),
            _ => self.input.is_some(),
        }
    }
}

/// How a row's cost was determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStatus {
    /// All rates the scheme needs were present
    Priced,
    /// The raw model matched no normalization rule
    Unrecognized,
    /// The model has no table entry, or is missing a rate its scheme reads
    NoRate,
}

impl fmt::Display for PricingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Priced => write!(f, "priced"),
            Self::Unrecognized => write!(f, "unrecognized"),
            Self::NoRate => write!(f, "no rate"),
        }
    }
}
