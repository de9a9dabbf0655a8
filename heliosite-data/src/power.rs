//! NASA POWER client for daily global horizontal irradiance.
//!
//! The POWER daily point API returns a date-keyed series of
//! `ALLSKY_SFC_SW_DWN` values in kWh/m²/day. The client requests a trailing
//! window ending today and reduces the series to the mean of its usable
//! samples; missing days are encoded upstream as `null` or the `-999` fill
//! value and are excluded from the mean.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use geo::Coord;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use heliosite_core::{IrradianceSource, SourceError};

use crate::cache::FetchCache;
use crate::http;
use crate::{ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Default base URL for the POWER API.
pub const DEFAULT_POWER_BASE_URL: &str = "https://power.larc.nasa.gov";

const POWER_PARAMETER: &str = "ALLSKY_SFC_SW_DWN";

/// Configuration for [`PowerClient`].
#[derive(Debug, Clone)]
pub struct PowerClientConfig {
    /// Base URL for the POWER service.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Length of the trailing window, in days.
    pub window_days: u64,
}

impl Default for PowerClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_POWER_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            window_days: 30,
        }
    }
}

impl PowerClientConfig {
    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the trailing window length.
    #[must_use]
    pub fn with_window_days(mut self, days: u64) -> Self {
        self.window_days = days;
        self
    }
}

/// POWER daily point response, reduced to the fields the client reads.
#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: PowerParameters,
}

#[derive(Debug, Deserialize)]
struct PowerParameters {
    #[serde(rename = "ALLSKY_SFC_SW_DWN")]
    irradiance: BTreeMap<String, Option<f64>>,
}

/// HTTP client for the NASA POWER daily irradiance series.
#[derive(Debug, Clone)]
pub struct PowerClient {
    client: Client,
    cache: Arc<FetchCache>,
    base: Url,
    config: PowerClientConfig,
}

impl PowerClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build or the default
    /// base URL does not parse.
    pub fn new(cache: Arc<FetchCache>) -> Result<Self, ClientBuildError> {
        Self::with_config(cache, PowerClientConfig::default())
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build or the base URL
    /// does not parse.
    pub fn with_config(
        cache: Arc<FetchCache>,
        config: PowerClientConfig,
    ) -> Result<Self, ClientBuildError> {
        let client = http::build_client(&config.user_agent, config.timeout)?;
        let base = Url::parse(&config.base_url).map_err(|source| ClientBuildError::BaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        Ok(Self {
            client,
            cache,
            base,
            config,
        })
    }

    /// Build the daily point URL for the given location and window.
    fn build_url(&self, point: Coord<f64>, start: NaiveDate, end: NaiveDate) -> String {
        let mut url = self.base.clone();
        url.set_path("/api/temporal/daily/point");
        url.query_pairs_mut()
            .append_pair("latitude", &point.y.to_string())
            .append_pair("longitude", &point.x.to_string())
            .append_pair("parameters", POWER_PARAMETER)
            .append_pair("community", "RE")
            .append_pair("format", "JSON")
            .append_pair("start", &start.format("%Y%m%d").to_string())
            .append_pair("end", &end.format("%Y%m%d").to_string());
        url.into()
    }

    fn parse_response(url: &str, body: &str) -> Result<PowerResponse, SourceError> {
        serde_json::from_str(body).map_err(|err| SourceError::Parse {
            url: url.to_owned(),
            message: err.to_string(),
        })
    }
}

/// Mean of the usable samples in a POWER daily series.
///
/// Missing days arrive as `null` or as the negative fill value; irradiance
/// cannot be negative, so both are excluded together.
fn mean_of_series(series: &BTreeMap<String, Option<f64>>) -> Option<f64> {
    let values: Vec<f64> = series
        .values()
        .filter_map(|value| value.filter(|&v| v >= 0.0))
        .collect();
    if values.is_empty() {
        return None;
    }
    #[expect(clippy::cast_precision_loss, reason = "window length is at most a few hundred days")]
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Some(mean)
}

#[async_trait]
impl IrradianceSource for PowerClient {
    async fn mean_daily_irradiance(&self, point: Coord<f64>) -> Result<Option<f64>, SourceError> {
        let end = Utc::now().date_naive();
        let start = end
            .checked_sub_days(Days::new(self.config.window_days))
            .unwrap_or(end);
        let url = self.build_url(point, start, end);

        let body = {
            let client = self.client.clone();
            let request_url = url.clone();
            let timeout = self.config.timeout;
            self.cache
                .get_or_fetch(url.clone(), async move {
                    http::get_text(&client, &request_url, timeout).await
                })
                .await?
        };

        let response = Self::parse_response(&url, &body)?;
        Ok(mean_of_series(&response.properties.parameter.irradiance))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn series(pairs: &[(&str, Option<f64>)]) -> BTreeMap<String, Option<f64>> {
        pairs
            .iter()
            .map(|(date, value)| ((*date).to_owned(), *value))
            .collect()
    }

    #[rstest]
    fn mean_skips_null_and_fill_values() {
        let series = series(&[
            ("20250101", Some(5.0)),
            ("20250102", Some(6.0)),
            ("20250103", None),
            ("20250104", Some(-999.0)),
        ]);
        let mean = mean_of_series(&series).expect("usable samples present");
        assert_relative_eq!(mean, 5.5, epsilon = 1e-12);
    }

    #[rstest]
    fn empty_series_yields_unknown() {
        assert!(mean_of_series(&series(&[])).is_none());
        assert!(mean_of_series(&series(&[("20250101", None)])).is_none());
        assert!(mean_of_series(&series(&[("20250101", Some(-999.0))])).is_none());
    }

    #[rstest]
    fn deserialises_daily_point_response() {
        let json = r#"{
            "properties": {
                "parameter": {
                    "ALLSKY_SFC_SW_DWN": {
                        "20250101": 5.2,
                        "20250102": null,
                        "20250103": 4.8
                    }
                }
            }
        }"#;

        let response =
            PowerClient::parse_response("http://example.com", json).expect("should deserialise");
        let mean = mean_of_series(&response.properties.parameter.irradiance)
            .expect("two usable samples");
        assert_relative_eq!(mean, 5.0, epsilon = 1e-12);
    }

    #[rstest]
    fn malformed_body_is_a_parse_error() {
        let err = PowerClient::parse_response("http://example.com", "not json")
            .expect_err("should fail");
        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[rstest]
    fn build_url_includes_location_and_window() {
        let cache = Arc::new(FetchCache::default());
        let client = PowerClient::new(cache).expect("client should build");
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date");

        let url = client.build_url(Coord { x: 75.8577, y: 22.7196 }, start, end);

        assert!(url.starts_with("https://power.larc.nasa.gov/api/temporal/daily/point?"));
        assert!(url.contains("latitude=22.7196"));
        assert!(url.contains("longitude=75.8577"));
        assert!(url.contains("parameters=ALLSKY_SFC_SW_DWN"));
        assert!(url.contains("start=20250101"));
        assert!(url.contains("end=20250131"));
    }
}
