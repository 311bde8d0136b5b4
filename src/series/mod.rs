//! Time-series normalization for dashboard charts.
//!
//! Per-metric query results are merged into one date-keyed table, classified
//! as daily or intraday from the first row's shape, then either gap-filled
//! day by day or resampled onto a uniform grid whose step is chosen from a
//! fixed ladder to stay under a point budget. Everything here is pure except
//! `merge::fetch_merged`, which awaits the query collaborator.

pub mod classify;
pub mod daily;
pub mod intraday;
pub mod merge;
pub mod normalize;
pub mod range;
pub mod time;
pub mod value;

pub use classify::{classify, SeriesKind};
pub use intraday::{select_interval, DownsampleConfig, DEFAULT_INTERVAL_LADDER_MINUTES, MAX_POINTS};
pub use merge::{fetch_merged, merge_series, MergedRow, RawSample};
pub use normalize::{normalize_time_series, NormalizedResult, TimePoint};
pub use range::{resolve_query_window, ChartView, DateRangeSpec, QueryWindow};
