//! Trend widget data: window resolution, concurrent fetch, stale-result
//! guard, normalization.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SeriesError, SeriesErrorPayload};
use crate::query::QueryFetcher;
use crate::series::intraday::DownsampleConfig;
use crate::series::merge::fetch_merged;
use crate::series::normalize::{normalize_time_series, NormalizedResult};
use crate::series::range::{is_sleep_detailed, resolve_query_window, ChartView, DateRangeSpec};
use crate::state::RequestEpoch;

/// What a trend widget asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    /// Takes precedence over `data_key` when non-empty; the first key is primary.
    #[serde(default)]
    pub data_keys: Vec<String>,
    #[serde(default)]
    pub date_range: DateRangeSpec,
    pub selected_date: NaiveDate,
    #[serde(default)]
    pub view: ChartView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_day_index: Option<usize>,
}

impl TrendRequest {
    pub fn new(data_key: &str, selected_date: NaiveDate) -> Self {
        Self {
            data_key: Some(data_key.to_string()),
            data_keys: Vec::new(),
            date_range: DateRangeSpec::default(),
            selected_date,
            view: ChartView::default(),
            selected_day_index: None,
        }
    }

    pub fn keys_to_fetch(&self) -> Vec<String> {
        if !self.data_keys.is_empty() {
            return self.data_keys.clone();
        }
        self.data_key
            .iter()
            .filter(|key| !key.is_empty())
            .cloned()
            .collect()
    }
}

/// Load and normalize the series for a trend widget.
///
/// Every call takes a new epoch ticket; if another call started while this
/// one was fetching, the result is `SeriesError::Superseded` and should be
/// dropped.
pub async fn load_trend(
    fetcher: Arc<dyn QueryFetcher>,
    epoch: &RequestEpoch,
    request: &TrendRequest,
    today: NaiveDate,
    downsample: &DownsampleConfig,
) -> Result<NormalizedResult, SeriesError> {
    let ticket = epoch.begin();
    let keys = request.keys_to_fetch();
    let Some(primary) = keys.first().cloned() else {
        return Ok(NormalizedResult::empty());
    };

    let window = resolve_query_window(
        &request.date_range,
        request.selected_date,
        today,
        &primary,
        request.view,
    );

    let merged = fetch_merged(fetcher, &keys, window).await;
    if !epoch.is_current(ticket) {
        let current = epoch.current();
        log::warn!(
            "trend: dropping result for '{}' (request {} superseded by {})",
            primary,
            ticket,
            current
        );
        return Err(SeriesError::Superseded { ticket, current });
    }
    let rows = merged?;

    let (start, end) = if is_sleep_detailed(&primary) {
        (None, None)
    } else {
        (window.start, window.end)
    };

    Ok(normalize_time_series(
        &rows,
        &primary,
        request.selected_day_index,
        start,
        end,
        downsample,
    ))
}

/// Render state handed to the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendView {
    NoSelection,
    NoData,
    #[serde(rename_all = "camelCase")]
    Error {
        message: String,
        recovery_suggestion: String,
        can_retry: bool,
    },
    Ready { result: NormalizedResult },
}

impl TrendView {
    /// Map a load outcome to a view. Superseded results map to `None`.
    pub fn from_result(
        request: &TrendRequest,
        result: Result<NormalizedResult, SeriesError>,
    ) -> Option<Self> {
        if request.keys_to_fetch().is_empty() {
            return Some(TrendView::NoSelection);
        }
        match result {
            Err(e) if e.is_superseded() => None,
            Err(e) => {
                log::warn!("trend: query failed: {}", e);
                let payload = SeriesErrorPayload::from(&e);
                Some(TrendView::Error {
                    message: payload.message,
                    recovery_suggestion: payload.recovery_suggestion,
                    can_retry: payload.can_retry,
                })
            }
            Ok(result) if result.is_empty() => Some(TrendView::NoData),
            Ok(result) => Some(TrendView::Ready { result }),
        }
    }
}
