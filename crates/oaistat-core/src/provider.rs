//! Provider trait for usage sources
//!
//! This module defines the `UsageSource` trait that all provider crates
//! implement. It gives the binary a uniform way to stream raw usage
//! records regardless of whether they come from the usage API or a file.

use crate::error::Result;
use crate::types::UsageRecord;
use async_trait::async_trait;
use futures::TryStreamExt;
use futures::stream::Stream;
use std::pin::Pin;

/// Boxed stream of usage records
pub type RecordStream<'a> = Pin<Box<dyn Stream<Item = Result<UsageRecord>> + Send + 'a>>;

/// Trait for provider-specific usage sources.
#[async_trait]
pub trait UsageSource: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &'static str;

    /// Stream every usage record the source holds.
    fn load_records(&self) -> RecordStream<'_>;

    /// Collect every record into memory, stopping at the first error.
    async fn load_all(&self) -> Result<Vec<UsageRecord>> {
        let records: Vec<UsageRecord> = self.load_records().try_collect().await?;
        tracing::info!("Loaded {} records from {}", records.len(), self.name());
        Ok(records)
    }
}
