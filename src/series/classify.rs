//! Daily vs intraday detection from the shape of the first row.

use serde::Serialize;

use super::merge::MergedRow;
use super::time::has_time_component;
use super::value::{nested_items, parse_if_stringified};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// One scalar or object per calendar day.
    Daily,
    /// Each day's value holds an array of timestamped samples (or `{ items: [...] }`).
    IntradayNested,
    /// Every row is itself a timestamped sample.
    IntradayFlat,
}

impl SeriesKind {
    pub fn is_intraday(self) -> bool {
        !matches!(self, SeriesKind::Daily)
    }
}

/// Classify a merged series by inspecting `rows[0]` only.
///
/// A first row whose own date carries a time of day wins over the value's
/// shape. A series whose first value is missing classifies as daily even if
/// later rows are nested.
pub fn classify(rows: &[MergedRow], primary_path: &str) -> SeriesKind {
    let Some(first) = rows.first() else {
        return SeriesKind::Daily;
    };

    if has_time_component(&first.date) {
        return SeriesKind::IntradayFlat;
    }

    let nested = first
        .get(primary_path)
        .map(parse_if_stringified)
        .is_some_and(|value| nested_items(&value).is_some());

    if nested {
        SeriesKind::IntradayNested
    } else {
        SeriesKind::Daily
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_string_is_daily() {
        let rows = vec![MergedRow::new("2024-01-01").with_value("hrv", json!("45"))];
        assert_eq!(classify(&rows, "hrv"), SeriesKind::Daily);
    }

    #[test]
    fn test_timestamped_date_is_flat_regardless_of_value() {
        let rows = vec![MergedRow::new("2024-01-01T10:00:00Z").with_value("hr", json!([1, 2]))];
        assert_eq!(classify(&rows, "hr"), SeriesKind::IntradayFlat);

        let rows = vec![MergedRow::new("2024-01-01T10:00:00Z").with_value("hr", json!(61))];
        assert_eq!(classify(&rows, "hr"), SeriesKind::IntradayFlat);
    }

    #[test]
    fn test_nested_shapes() {
        let rows = vec![MergedRow::new("2024-01-01").with_value("hr", json!([{ "bpm": 60 }]))];
        assert_eq!(classify(&rows, "hr"), SeriesKind::IntradayNested);

        let rows = vec![MergedRow::new("2024-01-01")
            .with_value("hr", json!({ "interval": 300, "items": [] }))];
        assert_eq!(classify(&rows, "hr"), SeriesKind::IntradayNested);

        let rows = vec![MergedRow::new("2024-01-01")
            .with_value("hr", json!(r#"{"items":[{"timestamp":"2024-01-01T00:00:00Z"}]}"#))];
        assert_eq!(classify(&rows, "hr"), SeriesKind::IntradayNested);
    }

    #[test]
    fn test_malformed_json_string_degrades_to_daily() {
        let rows = vec![MergedRow::new("2024-01-01").with_value("hr", json!("[1, 2"))];
        assert_eq!(classify(&rows, "hr"), SeriesKind::Daily);
    }

    #[test]
    fn test_only_first_row_is_inspected() {
        let rows = vec![
            MergedRow::new("2024-01-01"),
            MergedRow::new("2024-01-02").with_value("hr", json!([{ "bpm": 60 }])),
        ];
        assert_eq!(classify(&rows, "hr"), SeriesKind::Daily);
    }

    #[test]
    fn test_empty_rows_default_daily() {
        assert_eq!(classify(&[], "hr"), SeriesKind::Daily);
        assert!(!SeriesKind::Daily.is_intraday());
        assert!(SeriesKind::IntradayFlat.is_intraday());
    }
}
