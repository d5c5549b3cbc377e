//! Usage API data loader
//!
//! Issues one authenticated `GET /v1/usage?date=YYYY-MM-DD` per requested
//! calendar day, sequentially, and maps each returned item to a
//! [`UsageRecord`]. The endpoint reports tokens and requests only, so
//! character and second counters are always 0: speech and transcription
//! usage fetched this way prices at zero.

use async_trait::async_trait;
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use oaistat_core::error::{OaistatError, Result};
use oaistat_core::provider::{RecordStream, UsageSource};
use oaistat_core::types::{ISOTimestamp, ModelName, UsageCounters, UsageRecord};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Usage endpoint path
const USAGE_PATH: &str = "/v1/usage";

/// Value shipped in the sample config file
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

/// Longest date range fetched in one run
const MAX_RANGE_DAYS: i64 = 366;

/// Bearer token for the usage endpoint
#[derive(Clone)]
pub struct ApiCredentials {
    api_key: String,
}

impl ApiCredentials {
    /// Wrap an API key, rejecting blanks and the sample placeholder
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() || api_key == PLACEHOLDER_API_KEY {
            return Err(OaistatError::Config(
                "API key is missing. Set OPENAI_API_KEY, pass --api-key, or put a valid \
                 API_KEY in config.json"
                    .into(),
            ));
        }
        Ok(Self { api_key })
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Data loader for the usage endpoint.
pub struct DataLoader {
    client: reqwest::Client,
    credentials: ApiCredentials,
    base_url: String,
    dates: Vec<NaiveDate>,
    show_progress: bool,
}

impl DataLoader {
    /// Fetch usage for a single calendar day
    pub fn for_date(credentials: ApiCredentials, date: NaiveDate) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            dates: vec![date],
            show_progress: false,
        }
    }

    /// Fetch usage for every day from `since` to `until`, inclusive
    pub fn for_range(credentials: ApiCredentials, since: NaiveDate, until: NaiveDate) -> Result<Self> {
        let days = (until - since).num_days();
        if days < 0 {
            return Err(OaistatError::InvalidArgument(format!(
                "end date {until} is before start date {since}"
            )));
        }
        if days >= MAX_RANGE_DAYS {
            return Err(OaistatError::InvalidArgument(format!(
                "date range of {} days exceeds the {MAX_RANGE_DAYS}-day limit",
                days + 1
            )));
        }

        let dates = since.iter_days().take(days as usize + 1).collect();
        let mut loader = Self::for_date(credentials, since);
        loader.dates = dates;
        Ok(loader)
    }

    /// Use a preconfigured HTTP client (timeouts, proxy settings)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Override the API host (for proxies and tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Days this loader will request, in order
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Full request URL for one day
    pub fn usage_url(&self, date: NaiveDate) -> Result<reqwest::Url> {
        let endpoint = format!("{}{}", self.base_url.trim_end_matches('/'), USAGE_PATH);
        reqwest::Url::parse_with_params(&endpoint, &[("date", date.format("%Y-%m-%d").to_string())])
            .map_err(|e| OaistatError::Config(format!("invalid base URL '{}': {e}", self.base_url)))
    }

    /// Fetch and map one day of usage
    async fn fetch_day(&self, date: NaiveDate) -> Result<Vec<UsageRecord>> {
        let url = self.usage_url(date)?;
        debug!("Requesting {}", url);

        let body = self
            .client
            .get(url)
            .bearer_auth(&self.credentials.api_key)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let records = parse_usage_response(&body)?;
        info!("Fetched {} usage items for {}", records.len(), date);
        Ok(records)
    }
}

#[async_trait]
impl UsageSource for DataLoader {
    fn name(&self) -> &'static str {
        "usage API"
    }

    fn load_records(&self) -> RecordStream<'_> {
        Box::pin(async_stream::stream! {
            let progress = if self.show_progress && self.dates.len() > 1 {
                let pb = ProgressBar::new(self.dates.len() as u64);
                pb.set_style(
                    ProgressStyle::with_template("{spinner:.green} {msg} [{bar:30}] {pos}/{len} days")
                        .unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pb.set_message("Fetching usage");
                Some(pb)
            } else {
                None
            };

            for date in &self.dates {
                match self.fetch_day(*date).await {
                    Ok(records) => {
                        for record in records {
                            yield Ok(record);
                        }
                    }
                    Err(e) => {
                        if let Some(pb) = &progress {
                            pb.abandon_with_message(format!("Failed on {date}"));
                        }
                        yield Err(e);
                        return;
                    }
                }

                if let Some(pb) = &progress {
                    pb.inc(1);
                }
            }

            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Response schema
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct UsageResponse {
    #[serde(default)]
    data: Option<Vec<UsageItem>>,
}

#[derive(Deserialize)]
struct UsageItem {
    #[serde(default)]
    snapshot_id: String,
    #[serde(default)]
    n_context_tokens_total: u64,
    #[serde(default)]
    n_generated_tokens_total: u64,
    #[serde(default)]
    n_requests: u64,
    aggregation_timestamp: i64,
}

impl UsageItem {
    fn into_record(self) -> Result<UsageRecord> {
        Ok(UsageRecord {
            model: ModelName::new(self.snapshot_id),
            counters: UsageCounters {
                requests: self.n_requests,
                context_tokens: self.n_context_tokens_total,
                generated_tokens: self.n_generated_tokens_total,
                characters: 0,
                seconds: 0.0,
            },
            timestamp: ISOTimestamp::from_unix_seconds(self.aggregation_timestamp)?,
        })
    }
}

/// Map a usage endpoint response body to records
///
/// A missing, null, or empty `data` array yields no records.
pub fn parse_usage_response(body: &str) -> Result<Vec<UsageRecord>> {
    let response: UsageResponse = serde_json::from_str(body)?;
    response
        .data
        .unwrap_or_default()
        .into_iter()
        .map(UsageItem::into_record)
        .collect()
}
