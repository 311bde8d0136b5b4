//! Query collaborator: answers one metric path over an optional calendar range.
//!
//! `client` talks to the local data service over HTTP; `records` answers from
//! per-day records already in memory.

pub mod client;
pub mod records;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::SeriesError;
use crate::series::merge::RawSample;

pub use client::QueryClient;
pub use records::DayRecordFetcher;

/// Source of raw samples for a single metric path.
#[async_trait]
pub trait QueryFetcher: Send + Sync {
    /// Samples for `path`, ordered by date, within `[start, end]` when given.
    async fn query(
        &self,
        path: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawSample>, SeriesError>;
}
