//! Query windows for chart widgets and intraday key detection.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Key fragments that mark a metric as intraday.
const INTRADAY_KEY_FRAGMENTS: [&str; 7] = [
    "hr_data",
    "hrv_data",
    "movement",
    "sleep_phase",
    "hypnogram",
    "class_5_min",
    "met",
];

/// Inclusive calendar bounds passed to the data service. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl QueryWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self::new(Some(day), Some(day))
    }

    /// Whether a calendar day falls inside the window.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.map_or(true, |start| day >= start) && self.end.map_or(true, |end| day <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeUnit {
    Days,
    Years,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeAnchor {
    #[default]
    Today,
    SelectedDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    #[default]
    Area,
    Bar,
    Table,
}

/// Widget date range setting, as stored with the dashboard layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DateRangeSpec {
    /// Last 7 days up to today.
    #[default]
    Default,
    #[serde(rename_all = "camelCase")]
    Custom {
        #[serde(default)]
        start_date: Option<NaiveDate>,
        #[serde(default)]
        end_date: Option<NaiveDate>,
    },
    Relative {
        #[serde(default)]
        value: Option<u32>,
        #[serde(default)]
        unit: Option<RangeUnit>,
        #[serde(default)]
        anchor: RangeAnchor,
    },
    #[serde(rename_all = "camelCase")]
    ToToday {
        #[serde(default)]
        start_date: Option<NaiveDate>,
    },
    All,
    #[serde(rename = "last_90")]
    Last90,
    #[serde(rename = "last_30")]
    Last30,
}

/// True for metric paths whose values are intraday sample sets.
pub fn is_intraday_key(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let key = path.to_lowercase();
    INTRADAY_KEY_FRAGMENTS.iter().any(|frag| key.contains(frag))
        || (key.contains("stress") && !key.starts_with("resilience"))
}

/// Detailed sleep series are plotted over their own recorded span rather
/// than the whole requested day.
pub fn is_sleep_detailed(path: &str) -> bool {
    (path.contains("sleep") || path.contains("hypnogram")) && is_intraday_key(path)
}

/// Resolve the calendar window to query for a widget.
///
/// Intraday keys and table views always query just the selected day.
pub fn resolve_query_window(
    spec: &DateRangeSpec,
    selected: NaiveDate,
    today: NaiveDate,
    primary_path: &str,
    view: ChartView,
) -> QueryWindow {
    if is_intraday_key(primary_path) || view == ChartView::Table {
        return QueryWindow::single_day(selected);
    }

    match spec {
        DateRangeSpec::Custom {
            start_date,
            end_date,
        } => QueryWindow::new(
            Some(start_date.unwrap_or_else(|| days_before(selected, 30))),
            Some(end_date.unwrap_or(selected)),
        ),
        DateRangeSpec::Relative {
            value,
            unit,
            anchor,
        } => {
            let end = match anchor {
                RangeAnchor::SelectedDate => selected,
                RangeAnchor::Today => today,
            };
            let start = match (value.filter(|v| *v > 0), unit) {
                (Some(n), Some(RangeUnit::Days)) => days_before(end, u64::from(n)),
                (Some(n), Some(RangeUnit::Years)) => years_before(end, n),
                _ => days_before(end, 7),
            };
            QueryWindow::new(Some(start), Some(end))
        }
        DateRangeSpec::ToToday { start_date } => QueryWindow::new(
            Some(start_date.unwrap_or_else(|| days_before(today, 30))),
            Some(today),
        ),
        DateRangeSpec::All => QueryWindow::default(),
        DateRangeSpec::Last90 => QueryWindow::new(Some(days_before(today, 90)), Some(today)),
        DateRangeSpec::Last30 => QueryWindow::new(Some(days_before(today, 30)), Some(today)),
        DateRangeSpec::Default => QueryWindow::new(Some(days_before(today, 7)), Some(today)),
    }
}

fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap_or(NaiveDate::MIN)
}

fn years_before(day: NaiveDate, n: u32) -> NaiveDate {
    day.checked_sub_months(Months::new(n.saturating_mul(12)))
        .unwrap_or(NaiveDate::MIN)
}
