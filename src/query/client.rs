//! HTTP client for the local data service.
//!
//! Uses reqwest against `{apiBaseUrl}/api/query`, one request per metric path.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use url::Url;

use super::QueryFetcher;
use crate::error::SeriesError;
use crate::series::merge::RawSample;
use crate::series::time::format_day;
use crate::types::Config;

const QUERY_ENDPOINT: &str = "api/query";

pub struct QueryClient {
    client: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl QueryClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SeriesError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| SeriesError::Configuration(format!("Invalid apiBaseUrl {}: {}", base_url, e)))?;
        // Url::join replaces the last segment unless the base ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SeriesError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SeriesError> {
        Self::new(&config.api_base_url, config.request_timeout_secs)
    }

    /// Full request URL for a metric path and optional day bounds.
    pub fn query_url(
        &self,
        path: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Url, SeriesError> {
        let mut url = self
            .base_url
            .join(QUERY_ENDPOINT)
            .map_err(|e| SeriesError::Configuration(format!("Invalid query URL: {}", e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("path", path);
            if let Some(start) = start {
                pairs.append_pair("start_date", &format_day(start));
            }
            if let Some(end) = end {
                pairs.append_pair("end_date", &format_day(end));
            }
        }
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> SeriesError {
        if err.is_timeout() {
            SeriesError::Timeout(self.timeout_secs)
        } else {
            SeriesError::from(err)
        }
    }
}

#[async_trait]
impl QueryFetcher for QueryClient {
    async fn query(
        &self,
        path: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RawSample>, SeriesError> {
        let url = self.query_url(path, start, end)?;
        log::debug!("query: GET {}", url);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SeriesError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        let samples: Vec<RawSample> = serde_json::from_str(&body)?;
        Ok(samples)
    }
}
