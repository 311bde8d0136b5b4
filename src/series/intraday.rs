//! Uniform time grid for intraday series.
//!
//! Samples are sorted, an interval is picked from a fixed ladder so the grid
//! stays under the point budget, and every grid slot takes the nearest
//! unconsumed sample within half an interval, or null.

use chrono::{Duration, NaiveDate};
use serde_json::Value;

use super::classify::SeriesKind;
use super::merge::MergedRow;
use super::normalize::{NormalizedResult, TimePoint};
use super::time::{end_of_day, from_millis, iso_millis, parse_instant, start_of_day};
use super::value::{nested_items, parse_if_stringified, scalar_of};
use crate::types::Config;

/// Default upper bound on grid points per chart.
pub const MAX_POINTS: usize = 2000;

/// Default grid steps, in minutes, smallest first.
pub const DEFAULT_INTERVAL_LADDER_MINUTES: [u32; 7] = [5, 15, 30, 60, 240, 720, 1440];

/// Point budget and candidate grid steps for the intraday builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownsampleConfig {
    pub max_points: usize,
    /// Ascending, strictly positive.
    pub intervals: Vec<Duration>,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            max_points: MAX_POINTS,
            intervals: default_ladder(),
        }
    }
}

impl DownsampleConfig {
    /// Build a config, sorting the ladder and falling back to defaults for
    /// an empty ladder or a zero budget.
    pub fn new(max_points: usize, intervals: Vec<Duration>) -> Self {
        let mut intervals: Vec<Duration> = intervals
            .into_iter()
            .filter(|d| d.num_milliseconds() > 0)
            .collect();
        intervals.sort();
        intervals.dedup();

        if intervals.is_empty() {
            log::warn!("downsample: empty interval ladder, using defaults");
            intervals = default_ladder();
        }

        let max_points = if max_points == 0 {
            log::warn!("downsample: max points must be positive, using {}", MAX_POINTS);
            MAX_POINTS
        } else {
            max_points
        };

        Self {
            max_points,
            intervals,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.max_points,
            config
                .interval_ladder_minutes
                .iter()
                .map(|m| Duration::minutes(i64::from(*m)))
                .collect(),
        )
    }
}

fn default_ladder() -> Vec<Duration> {
    DEFAULT_INTERVAL_LADDER_MINUTES
        .iter()
        .map(|m| Duration::minutes(i64::from(*m)))
        .collect()
}

/// Pick the smallest ladder step that keeps `span / step` within the budget.
///
/// When even the largest step is too fine, it is widened to the smallest
/// whole multiple of itself that satisfies the budget.
pub fn select_interval(span: Duration, config: &DownsampleConfig) -> Duration {
    let min_interval_ms = span.num_milliseconds() as f64 / config.max_points.max(1) as f64;

    if let Some(step) = config
        .intervals
        .iter()
        .find(|step| step.num_milliseconds() as f64 >= min_interval_ms)
    {
        return *step;
    }

    let largest = config
        .intervals
        .last()
        .copied()
        .unwrap_or_else(|| Duration::days(1));
    let multiple = (min_interval_ms / largest.num_milliseconds() as f64).ceil() as i32;
    log::debug!(
        "downsample: span {}ms exceeds ladder, widening {}ms x{}",
        span.num_milliseconds(),
        largest.num_milliseconds(),
        multiple
    );
    largest * multiple.max(1)
}

/// A sample with a resolved instant and its representative scalar.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TimedSample {
    at_ms: i64,
    scalar: Option<f64>,
}

/// Build the intraday grid for a merged series already classified as intraday.
pub fn build_intraday_grid(
    rows: &[MergedRow],
    primary_path: &str,
    kind: SeriesKind,
    selected_index: Option<usize>,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
    config: &DownsampleConfig,
) -> NormalizedResult {
    let (raw_items, target_index, day_row) = match kind {
        SeriesKind::IntradayFlat => (Some(flat_items(rows, primary_path)), 0, rows.last()),
        _ => {
            let target_index = selected_index
                .unwrap_or(usize::MAX)
                .min(rows.len().saturating_sub(1));
            let day_row = rows.get(target_index);
            let items = day_row
                .and_then(|row| row.get(primary_path))
                .map(parse_if_stringified)
                .and_then(|value| nested_items(&value).cloned());
            (items, target_index, day_row)
        }
    };

    let Some(raw_items) = raw_items else {
        log::debug!("intraday: '{}' has no nested sample array", primary_path);
        return NormalizedResult::empty();
    };

    let finish = |points: Vec<TimePoint>| NormalizedResult {
        points,
        is_intraday: true,
        current_day: day_row.map(|row| row.date.clone()),
        current_index: Some(target_index),
        total_days: Some(rows.len()),
    };

    let missing = raw_items.iter().filter(|item| timestamp_of(item).is_none()).count();
    if missing > 0 {
        log::warn!(
            "intraday: {} of {} samples for '{}' have no timestamp; not rendering",
            missing,
            raw_items.len(),
            primary_path
        );
        return finish(Vec::new());
    }

    let samples = timed_samples(&raw_items);

    let start_ms = match requested_start {
        Some(day) => start_of_day(day).map(|dt| dt.timestamp_millis()),
        None => samples.first().map(|s| s.at_ms),
    };
    let end_ms = match requested_end {
        Some(day) => end_of_day(day).map(|dt| dt.timestamp_millis()),
        None => samples.last().map(|s| s.at_ms),
    };
    let (Some(start_ms), Some(end_ms)) = (start_ms, end_ms) else {
        return finish(Vec::new());
    };

    let interval = select_interval(Duration::milliseconds(end_ms - start_ms), config);
    finish(grid_points(&samples, primary_path, start_ms, end_ms, interval))
}

/// Flat rows become samples stamped with the row's own date; null values are dropped.
fn flat_items(rows: &[MergedRow], primary_path: &str) -> Vec<Value> {
    rows.iter()
        .filter_map(|row| {
            let value = row.get(primary_path).filter(|v| !v.is_null())?;
            let mut item = match value {
                Value::Object(map) => map.clone(),
                scalar => {
                    let mut map = serde_json::Map::new();
                    map.insert("value".to_string(), scalar.clone());
                    map
                }
            };
            item.insert("timestamp".to_string(), Value::String(row.date.clone()));
            Some(Value::Object(item))
        })
        .collect()
}

fn timestamp_of(item: &Value) -> Option<&Value> {
    item.as_object()
        .and_then(|map| map.get("timestamp"))
        .filter(|ts| !ts.is_null())
}

/// Resolve instants, drop unparseable or non-positive ones, sort ascending.
fn timed_samples(raw_items: &[Value]) -> Vec<TimedSample> {
    let mut samples: Vec<TimedSample> = raw_items
        .iter()
        .filter_map(|item| {
            let at_ms = timestamp_of(item)
                .and_then(Value::as_str)
                .and_then(parse_instant)
                .map(|dt| dt.timestamp_millis())
                .filter(|ms| *ms > 0)?;
            Some(TimedSample {
                at_ms,
                scalar: scalar_of(item),
            })
        })
        .collect();
    samples.sort_by_key(|s| s.at_ms);
    samples
}

fn grid_points(
    samples: &[TimedSample],
    primary_path: &str,
    start_ms: i64,
    end_ms: i64,
    interval: Duration,
) -> Vec<TimePoint> {
    let step = interval.num_milliseconds();
    if step <= 0 || end_ms < start_ms {
        return Vec::new();
    }

    let mut points = Vec::with_capacity(((end_ms - start_ms) / step + 1) as usize);
    let mut cursor = 0;
    let mut t = start_ms;

    while t <= end_ms {
        // Samples more than half a step behind this slot can no longer match.
        while cursor < samples.len() && 2 * (t - samples[cursor].at_ms) > step {
            cursor += 1;
        }

        let date = from_millis(t).map(iso_millis).unwrap_or_default();
        match samples.get(cursor) {
            Some(sample) if 2 * (sample.at_ms - t).abs() <= step => {
                points.push(TimePoint::sample(date, primary_path, sample.scalar));
                cursor += 1;
            }
            _ => points.push(TimePoint::gap(date, primary_path)),
        }

        t += step;
    }

    points
}
