//! In-memory query source over per-day health records.
//!
//! Answers a metric path the way the data service does: resolve the dotted
//! path inside each day's record, keep days inside the window, skip days
//! where the path does not exist.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::QueryFetcher;
use crate::error::SeriesError;
use crate::series::merge::RawSample;
use crate::series::range::QueryWindow;
use crate::series::time::calendar_day;
use crate::series::value::resolve_path;

/// One day's full record, e.g. `{ "sleep": { "score": 81, ... }, "readiness": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    pub record: Value,
}

#[derive(Debug, Clone, Default)]
pub struct DayRecordFetcher {
    records: Vec<DayRecord>,
}

impl DayRecordFetcher {
    pub fn new(mut records: Vec<DayRecord>) -> Self {
        records.sort_by(|a, b| a.date.cmp(&b.date));
        Self { records }
    }

    /// Load records from a JSON array of `{ "date": ..., "record": {...} }`.
    pub fn from_json(json: &str) -> Result<Self, SeriesError> {
        let records: Vec<DayRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Samples for `path` within `window`, in date order.
    pub fn samples(&self, path: &str, window: QueryWindow) -> Vec<RawSample> {
        let bounded = window.start.is_some() || window.end.is_some();
        self.records
            .iter()
            .filter(|rec| match calendar_day(&rec.date) {
                Some(day) => window.contains(day),
                None => !bounded,
            })
            .filter_map(|rec| {
                resolve_path(&rec.record, path).map(|value| RawSample::new(rec.date.clone(), value.clone()))
            })
            .collect()
    }
}

#[async_trait]
impl QueryFetcher for DayRecordFetcher {
    async fn query(
        &self,
        path: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawSample>, SeriesError> {
        Ok(self.samples(path, QueryWindow::new(start, end)))
    }
}
