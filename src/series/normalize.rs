//! Entry point that turns merged rows into plot-ready points.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use super::classify::{classify, SeriesKind};
use super::daily::fill_daily;
use super::intraday::{build_intraday_grid, DownsampleConfig};
use super::merge::MergedRow;

/// One plotted point: the date, the primary scalar, and per-path values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub date: String,
    pub value: Option<f64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TimePoint {
    /// A slot with no source sample.
    pub fn gap(date: impl Into<String>, primary_path: &str) -> Self {
        let mut fields = Map::new();
        fields.insert(primary_path.to_string(), Value::Null);
        Self {
            date: date.into(),
            value: None,
            fields,
        }
    }

    pub fn sample(date: impl Into<String>, primary_path: &str, scalar: Option<f64>) -> Self {
        let mut fields = Map::new();
        fields.insert(primary_path.to_string(), scalar_value(scalar));
        Self {
            date: date.into(),
            value: scalar,
            fields,
        }
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }
}

fn scalar_value(scalar: Option<f64>) -> Value {
    scalar
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub points: Vec<TimePoint>,
    pub is_intraday: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_days: Option<usize>,
}

impl NormalizedResult {
    pub fn empty() -> Self {
        Self {
            points: Vec::new(),
            is_intraday: false,
            current_day: None,
            current_index: None,
            total_days: None,
        }
    }

    pub fn daily(points: Vec<TimePoint>) -> Self {
        Self {
            points,
            ..Self::empty()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Normalize a merged series for rendering.
///
/// Daily series get one point per calendar day; intraday series get a uniform
/// grid bounded by `config.max_points`. With no rows and an incomplete range
/// the result is empty.
pub fn normalize_time_series(
    rows: &[MergedRow],
    primary_path: &str,
    selected_index: Option<usize>,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
    config: &DownsampleConfig,
) -> NormalizedResult {
    if rows.is_empty() && (requested_start.is_none() || requested_end.is_none()) {
        return NormalizedResult::empty();
    }

    let kind = classify(rows, primary_path);
    log::debug!(
        "normalize: '{}' classified {:?} over {} rows",
        primary_path,
        kind,
        rows.len()
    );

    match kind {
        SeriesKind::Daily => NormalizedResult::daily(fill_daily(
            rows,
            primary_path,
            requested_start,
            requested_end,
        )),
        SeriesKind::IntradayNested | SeriesKind::IntradayFlat => build_intraday_grid(
            rows,
            primary_path,
            kind,
            selected_index,
            requested_start,
            requested_end,
            config,
        ),
    }
}
