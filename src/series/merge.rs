//! Joins independently fetched metric series into one date-keyed table.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::task::JoinSet;

use super::range::QueryWindow;
use super::time::parse_instant;
use crate::error::SeriesError;
use crate::query::QueryFetcher;

/// One sample as returned by the data service for a single metric path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub date: String,
    #[serde(default)]
    pub value: Value,
}

impl RawSample {
    pub fn new(date: impl Into<String>, value: Value) -> Self {
        Self {
            date: date.into(),
            value,
        }
    }
}

/// A row of the merged table: one date plus the value of every metric path
/// that reported a sample for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub date: String,
    /// Same as `date`; charting code keys tooltips off it.
    pub timestamp: String,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl MergedRow {
    pub fn new(date: impl Into<String>) -> Self {
        let date = date.into();
        Self {
            timestamp: date.clone(),
            date,
            values: Map::new(),
        }
    }

    pub fn with_value(mut self, path: &str, value: Value) -> Self {
        self.values.insert(path.to_string(), value);
        self
    }

    /// Value for a metric path. `Some(Value::Null)` means the service sent an explicit null.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }
}

/// Merge per-path results into rows keyed by the sample date, sorted ascending.
///
/// When one path reports several samples for the same date the last one wins.
pub fn merge_series<I>(results: I) -> Vec<MergedRow>
where
    I: IntoIterator<Item = (String, Vec<RawSample>)>,
{
    let mut rows: Vec<MergedRow> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (path, samples) in results {
        for sample in samples {
            let slot = *index.entry(sample.date.clone()).or_insert_with(|| {
                rows.push(MergedRow::new(sample.date.clone()));
                rows.len() - 1
            });
            rows[slot].values.insert(path.clone(), sample.value);
        }
    }

    sort_rows_by_date(&mut rows);
    rows
}

/// Stable ascending sort by parsed instant; unparseable dates go last.
pub fn sort_rows_by_date(rows: &mut [MergedRow]) {
    rows.sort_by_cached_key(|row| match parse_instant(&row.date) {
        Some(instant) => (0u8, instant.timestamp_millis()),
        None => (1u8, 0),
    });
}

/// Fetch every path concurrently and merge the results.
///
/// The first failing fetch fails the whole merge; outstanding fetches are
/// aborted when the task set is dropped.
pub async fn fetch_merged(
    fetcher: Arc<dyn QueryFetcher>,
    paths: &[String],
    window: QueryWindow,
) -> Result<Vec<MergedRow>, SeriesError> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let mut tasks = JoinSet::new();
    for (idx, path) in paths.iter().cloned().enumerate() {
        let fetcher = Arc::clone(&fetcher);
        tasks.spawn(async move {
            let samples = fetcher.query(&path, window.start, window.end).await;
            (idx, path, samples)
        });
    }

    let mut results: Vec<Option<(String, Vec<RawSample>)>> = vec![None; paths.len()];
    while let Some(joined) = tasks.join_next().await {
        let (idx, path, samples) = joined?;
        match samples {
            Ok(samples) => results[idx] = Some((path, samples)),
            Err(e) => {
                log::warn!("merge: query for '{}' failed: {}", path, e);
                return Err(e);
            }
        }
    }

    // Keep the caller's path order so same-date rows are created deterministically.
    Ok(merge_series(results.into_iter().flatten()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn samples(pairs: &[(&str, Value)]) -> Vec<RawSample> {
        pairs
            .iter()
            .map(|(d, v)| RawSample::new(*d, v.clone()))
            .collect()
    }

    #[test]
    fn test_merge_union_of_dates() {
        let rows = merge_series(vec![
            (
                "A".to_string(),
                samples(&[("2024-01-01", json!(1)), ("2024-01-02", json!(2))]),
            ),
            (
                "B".to_string(),
                samples(&[("2024-01-02", json!(20)), ("2024-01-03", json!(30))]),
            ),
        ]);

        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(rows[0].get("A"), Some(&json!(1)));
        assert_eq!(rows[0].get("B"), None);
        assert_eq!(rows[1].get("A"), Some(&json!(2)));
        assert_eq!(rows[1].get("B"), Some(&json!(20)));
        assert_eq!(rows[2].timestamp, "2024-01-03");
    }

    #[test]
    fn test_merge_duplicate_date_last_wins() {
        let rows = merge_series(vec![(
            "A".to_string(),
            samples(&[("2024-01-01", json!(1)), ("2024-01-01", json!(9))]),
        )]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("A"), Some(&json!(9)));
    }

    #[test]
    fn test_merge_sorts_by_instant() {
        let rows = merge_series(vec![(
            "hr".to_string(),
            samples(&[
                ("2024-01-01T10:05:00Z", json!(61)),
                ("2024-01-01T12:00:00+02:00", json!(60)),
                ("2024-01-01T09:00:00Z", json!(59)),
            ]),
        )]);
        let values: Vec<&Value> = rows.iter().filter_map(|r| r.get("hr")).collect();
        assert_eq!(values, vec![&json!(59), &json!(60), &json!(61)]);
    }

    #[test]
    fn test_merged_row_serializes_flat() {
        let row = MergedRow::new("2024-01-01").with_value("sleep.score", json!(80));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            json!({ "date": "2024-01-01", "timestamp": "2024-01-01", "sleep.score": 80 })
        );
    }

    struct SlowFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl QueryFetcher for SlowFetcher {
        async fn query(
            &self,
            path: &str,
            _start: Option<NaiveDate>,
            _end: Option<NaiveDate>,
        ) -> Result<Vec<RawSample>, SeriesError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if path == "broken" {
                return Err(SeriesError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(vec![RawSample::new("2024-01-01", json!(path.len()))])
        }
    }

    #[tokio::test]
    async fn test_fetch_merged_runs_concurrently() {
        let fetcher = Arc::new(SlowFetcher {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let paths = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];

        let rows = fetch_merged(fetcher.clone(), &paths, QueryWindow::default())
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("bb"), Some(&json!(2)));
        assert_eq!(fetcher.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fetch_merged_fails_whole_merge() {
        let fetcher = Arc::new(SlowFetcher {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let paths = vec!["ok".to_string(), "broken".to_string()];

        let err = fetch_merged(fetcher, &paths, QueryWindow::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SeriesError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_merged_no_paths() {
        let fetcher = Arc::new(SlowFetcher {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let rows = fetch_merged(fetcher, &[], QueryWindow::default()).await.unwrap();
        assert!(rows.is_empty());
    }
}
