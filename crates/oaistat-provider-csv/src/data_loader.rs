//! CSV export data loader
//!
//! Reads a comma-delimited usage export with a header row:
//!
//! ```text
//! model,n_context_tokens_total,n_generated_tokens_total,num_requests,num_characters,num_seconds,timestamp
//! gpt-4o-2024-08-06,1000,500,1,0,0,1727827200
//! whisper-1,0,0,1,0,30.5,1727827200
//! ```
//!
//! Files are decoded as ISO-8859-1. Extra columns are ignored, and
//! `num_characters` / `num_seconds` may be omitted. Blank counter cells
//! count as 0; `timestamp` is epoch seconds and always required.

use async_trait::async_trait;
use oaistat_core::error::{OaistatError, Result};
use oaistat_core::provider::{RecordStream, UsageSource};
use oaistat_core::types::{ISOTimestamp, ModelName, UsageCounters, UsageRecord};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Columns that must appear in the header
const REQUIRED_COLUMNS: &[&str] = &[
    "model",
    "n_context_tokens_total",
    "n_generated_tokens_total",
    "num_requests",
    "timestamp",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Data loader for CSV usage exports.
pub struct DataLoader {
    path: PathBuf,
}

impl DataLoader {
    /// Create a loader for a CSV file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path being read
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_records(&self) -> Result<Vec<UsageRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let text = decode_latin1(&bytes);
        parse_usage_csv(&text, &self.path)
    }
}

#[async_trait]
impl UsageSource for DataLoader {
    fn name(&self) -> &'static str {
        "CSV export"
    }

    fn load_records(&self) -> RecordStream<'_> {
        Box::pin(async_stream::stream! {
            match self.read_records().await {
                Ok(records) => {
                    for record in records {
                        yield Ok(record);
                    }
                }
                Err(e) => {
                    yield Err(e);
                }
            }
        })
    }
}

/// Decode ISO-8859-1 bytes; every byte maps to the code point of the same value
fn decode_latin1(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    bytes.iter().map(|&b| b as char).collect()
}

#[derive(Deserialize)]
struct CsvRow {
    #[serde(default)]
    model: String,
    n_context_tokens_total: Option<String>,
    n_generated_tokens_total: Option<String>,
    num_requests: Option<String>,
    #[serde(default)]
    num_characters: Option<String>,
    #[serde(default)]
    num_seconds: Option<f64>,
    timestamp: Option<f64>,
}

impl CsvRow {
    fn into_record(self) -> std::result::Result<UsageRecord, String> {
        let timestamp = self
            .timestamp
            .ok_or_else(|| "timestamp is empty".to_string())?;

        Ok(UsageRecord {
            model: ModelName::new(self.model),
            counters: UsageCounters {
                requests: count(self.num_requests.as_deref(), "num_requests")?,
                context_tokens: count(
                    self.n_context_tokens_total.as_deref(),
                    "n_context_tokens_total",
                )?,
                generated_tokens: count(
                    self.n_generated_tokens_total.as_deref(),
                    "n_generated_tokens_total",
                )?,
                characters: count(self.num_characters.as_deref(), "num_characters")?,
                seconds: seconds(self.num_seconds)?,
            },
            timestamp: ISOTimestamp::from_unix_seconds_f64(timestamp).map_err(|e| e.to_string())?,
        })
    }
}

/// Non-negative whole-number cell; blank is 0
///
/// Integers are read exactly. A float spelling such as `1000.0` is accepted
/// when it is whole and fits in a `u64`.
fn count(value: Option<&str>, column: &str) -> std::result::Result<u64, String> {
    let cell = match value.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(cell) => cell,
    };

    if let Ok(n) = cell.parse::<u64>() {
        return Ok(n);
    }

    match cell.parse::<f64>() {
        // u64::MAX as f64 rounds up to 2^64, which is out of range
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v < u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err(format!(
            "{column} must be a non-negative whole number no larger than {}, got '{cell}'",
            u64::MAX
        )),
    }
}

/// Non-negative duration cell; blank is 0
fn seconds(value: Option<f64>) -> std::result::Result<f64, String> {
    match value {
        None => Ok(0.0),
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(format!("num_seconds must be a non-negative number, got {v}")),
    }
}

/// Parse CSV text into usage records; `path` is only used in error messages
pub fn parse_usage_csv(text: &str, path: &Path) -> Result<Vec<UsageRecord>> {
    let parse_error = |error: String| OaistatError::Parse {
        file: path.to_path_buf(),
        error,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(parse_error(format!("missing column '{column}'")));
        }
    }

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = row.map_err(|e| parse_error(format!("line {line}: {e}")))?;
        let record = row
            .into_record()
            .map_err(|e| parse_error(format!("line {line}: {e}")))?;
        records.push(record);
    }

    debug!("Parsed {} rows from {}", records.len(), path.display());
    Ok(records)
}
