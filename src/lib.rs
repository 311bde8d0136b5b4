//! Health metric series for dashboard charts: fetch per-metric samples from
//! the local data service, merge them by date, and normalize them into
//! gap-filled daily points or a bounded intraday grid.

pub mod error;
pub mod query;
pub mod series;
pub mod services;
pub mod state;
pub mod types;

pub use error::{SeriesError, SeriesErrorPayload};
pub use query::{DayRecordFetcher, QueryClient, QueryFetcher};
pub use series::{normalize_time_series, DownsampleConfig, NormalizedResult, TimePoint};
pub use services::trend::{load_trend, TrendRequest, TrendView};
