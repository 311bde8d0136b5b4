//! healthdash: query the local data service and print a normalized series.
//!
//! The first path is primary. `--day` picks the day for nested intraday series.

use std::sync::Arc;

use chrono::NaiveDate;
use clap::Parser;

use healthdash_lib::query::QueryClient;
use healthdash_lib::series::merge::fetch_merged;
use healthdash_lib::series::range::QueryWindow;
use healthdash_lib::series::time::require_day;
use healthdash_lib::series::{normalize_time_series, DownsampleConfig};
use healthdash_lib::state::load_config_or_default;

#[derive(Parser, Debug)]
#[command(name = "healthdash", version, about = "Fetch, merge and normalize health metric series")]
struct Args {
    /// Metric paths to fetch, e.g. `sleep.score`; the first one is plotted
    #[arg(required = true, num_args = 1..)]
    paths: Vec<String>,
    /// First calendar day to query (YYYY-MM-DD)
    #[arg(long, value_parser = require_day)]
    start: Option<NaiveDate>,
    /// Last calendar day to query (YYYY-MM-DD)
    #[arg(long, value_parser = require_day)]
    end: Option<NaiveDate>,
    /// Day index for nested intraday series; defaults to the last day
    #[arg(long)]
    day: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = load_config_or_default();
    let downsample = DownsampleConfig::from_config(&config);
    let client = QueryClient::from_config(&config)?;

    let window = QueryWindow::new(args.start, args.end);
    let rows = fetch_merged(Arc::new(client), &args.paths, window).await?;
    log::info!("Fetched {} rows for {} paths", rows.len(), args.paths.len());

    let result = normalize_time_series(
        &rows,
        &args.paths[0],
        args.day,
        args.start,
        args.end,
        &downsample,
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths_and_flags() {
        let args = Args::try_parse_from([
            "healthdash",
            "sleep.score",
            "--start",
            "2024-01-01",
            "readiness.score",
            "--day",
            "2",
        ])
        .unwrap();
        assert_eq!(args.paths, vec!["sleep.score", "readiness.score"]);
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(args.end, None);
        assert_eq!(args.day, Some(2));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Args::try_parse_from(["healthdash"]).is_err());
        assert!(Args::try_parse_from(["healthdash", "x", "--start"]).is_err());
        assert!(Args::try_parse_from(["healthdash", "x", "--day", "two"]).is_err());
        assert!(Args::try_parse_from(["healthdash", "x", "--verbose"]).is_err());

        let err = Args::try_parse_from(["healthdash", "x", "--end", "01/02/2024"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("Invalid date: 01/02/2024"));
    }
}
