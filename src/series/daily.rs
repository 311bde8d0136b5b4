//! Gap filling for daily series: exactly one point per calendar day.

use chrono::NaiveDate;

use super::merge::MergedRow;
use super::normalize::TimePoint;
use super::time::{calendar_day, format_day};
use super::value::scalar_of;

/// Emit one point per day in `[start, end]`, inserting null points for
/// days the source has no row for.
///
/// The range defaults to the first and last row's day; requested bounds take
/// precedence. Rows that share a day collapse to the first one after sorting,
/// and rows with unparseable dates are ignored.
pub fn fill_daily(
    rows: &[MergedRow],
    primary_path: &str,
    requested_start: Option<NaiveDate>,
    requested_end: Option<NaiveDate>,
) -> Vec<TimePoint> {
    let mut dated: Vec<(NaiveDate, &MergedRow)> = rows
        .iter()
        .filter_map(|row| match calendar_day(&row.date) {
            Some(day) => Some((day, row)),
            None => {
                log::debug!("daily: dropping row with unparseable date '{}'", row.date);
                None
            }
        })
        .collect();
    dated.sort_by_key(|(day, _)| *day);

    let start = requested_start.or_else(|| dated.first().map(|(day, _)| *day));
    let end = requested_end.or_else(|| dated.last().map(|(day, _)| *day));
    let (Some(start), Some(end)) = (start, end) else {
        return Vec::new();
    };

    let capacity = (end - start).num_days().max(-1) + 1;
    let mut filled = Vec::with_capacity(capacity as usize);
    let mut cursor = 0;
    let mut current = start;

    while current <= end {
        // Skip rows left behind by the requested start or by duplicate days.
        while cursor < dated.len() && dated[cursor].0 < current {
            cursor += 1;
        }

        if cursor < dated.len() && dated[cursor].0 == current {
            filled.push(point_from_row(current, dated[cursor].1, primary_path));
            cursor += 1;
        } else {
            filled.push(TimePoint::gap(format_day(current), primary_path));
        }

        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }

    filled
}

fn point_from_row(day: NaiveDate, row: &MergedRow, primary_path: &str) -> TimePoint {
    TimePoint {
        date: format_day(day),
        value: row.get(primary_path).and_then(scalar_of),
        fields: row.values.clone(),
    }
}
