//! OpenTopoData client deriving terrain slope from an elevation grid.
//!
//! Slope is computed from a 3×3 grid of point samples spaced ~100 m around
//! the query point: a central-difference gradient in metres per metre,
//! converted to degrees. A single missing sample invalidates the whole
//! computation — a partial grid would silently bias the gradient.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use log::warn;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use heliosite_core::{SlopeSource, SourceError};

use crate::cache::FetchCache;
use crate::http;
use crate::{ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Default base URL for the OpenTopoData service.
pub const DEFAULT_ELEVATION_BASE_URL: &str = "https://api.opentopodata.org";

/// Grid spacing in degrees, roughly 100 m at the equator.
const GRID_STEP_DEG: f64 = 0.001;

/// Metres per degree of latitude, and of longitude at the equator.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// Configuration for [`ElevationClient`].
#[derive(Debug, Clone)]
pub struct ElevationClientConfig {
    /// Base URL for the elevation service.
    pub base_url: String,
    /// Elevation dataset to sample.
    pub dataset: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ElevationClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ELEVATION_BASE_URL.to_owned(),
            dataset: "srtm90m".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// OpenTopoData response, reduced to the fields the client reads.
#[derive(Debug, Deserialize)]
struct ElevationResponse {
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
struct ElevationResult {
    elevation: Option<f64>,
}

/// HTTP client for OpenTopoData point elevations.
#[derive(Debug, Clone)]
pub struct ElevationClient {
    client: Client,
    cache: Arc<FetchCache>,
    base: Url,
    config: ElevationClientConfig,
}

impl ElevationClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build or the default
    /// base URL does not parse.
    pub fn new(cache: Arc<FetchCache>) -> Result<Self, ClientBuildError> {
        Self::with_config(cache, ElevationClientConfig::default())
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build or the base URL
    /// does not parse.
    pub fn with_config(
        cache: Arc<FetchCache>,
        config: ElevationClientConfig,
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

    /// Build the lookup URL for the 3×3 grid around `point`.
    fn build_url(&self, point: Coord<f64>) -> String {
        let locations = grid_locations(point)
            .map(|p| format!("{},{}", p.y, p.x))
            .collect::<Vec<_>>()
            .join("|");
        let mut url = self.base.clone();
        url.set_path(&format!("/v1/{}", self.config.dataset));
        url.query_pairs_mut().append_pair("locations", &locations);
        url.into()
    }

    fn parse_response(url: &str, body: &str) -> Result<ElevationResponse, SourceError> {
        let response: ElevationResponse =
            serde_json::from_str(body).map_err(|err| SourceError::Parse {
                url: url.to_owned(),
                message: err.to_string(),
            })?;
        if response.status != "OK" {
            return Err(SourceError::Service {
                url: url.to_owned(),
                message: response
                    .error
                    .unwrap_or_else(|| format!("status {}", response.status)),
            });
        }
        Ok(response)
    }
}

/// The nine grid sample points around `point`, row-major from south-west.
fn grid_locations(point: Coord<f64>) -> impl Iterator<Item = Coord<f64>> {
    const OFFSETS: [f64; 3] = [-GRID_STEP_DEG, 0.0, GRID_STEP_DEG];
    OFFSETS.into_iter().flat_map(move |dy| {
        OFFSETS.into_iter().map(move |dx| Coord {
            x: point.x + dx,
            y: point.y + dy,
        })
    })
}

/// Assemble the row-major sample list into a 3×3 grid.
///
/// Returns `None` when any sample is missing; a partial grid cannot yield a
/// trustworthy gradient.
fn grid_from_results(results: &[ElevationResult]) -> Option<[[f64; 3]; 3]> {
    if results.len() != 9 {
        return None;
    }
    let mut grid = [[0.0_f64; 3]; 3];
    for (index, result) in results.iter().enumerate() {
        grid[index / 3][index % 3] = result.elevation?;
    }
    Some(grid)
}

/// Central-difference slope of a 3×3 elevation grid, in degrees.
///
/// Rows run south to north, columns west to east. The east–west metre
/// spacing shrinks with the cosine of the latitude.
fn slope_degrees_from_grid(latitude_deg: f64, grid: &[[f64; 3]; 3]) -> f64 {
    let dz_dx =
        (grid[1][2] - grid[1][0]) / (2.0 * METERS_PER_DEGREE * latitude_deg.to_radians().cos());
    let dz_dy = (grid[2][1] - grid[0][1]) / (2.0 * METERS_PER_DEGREE);
    dz_dx.hypot(dz_dy).atan().to_degrees()
}

#[async_trait]
impl SlopeSource for ElevationClient {
    async fn slope_degrees(&self, point: Coord<f64>) -> Result<Option<f64>, SourceError> {
        let url = self.build_url(point);

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
        let Some(grid) = grid_from_results(&response.results) else {
            warn!(
                "elevation grid at ({}, {}) is incomplete; slope unknown",
                point.y, point.x
            );
            return Ok(None);
        };
        Ok(Some(slope_degrees_from_grid(point.y, &grid)))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn results(elevations: &[Option<f64>]) -> Vec<ElevationResult> {
        elevations
            .iter()
            .map(|&elevation| ElevationResult { elevation })
            .collect()
    }

    #[rstest]
    fn flat_grid_has_zero_slope() {
        let grid = [[100.0; 3]; 3];
        assert_relative_eq!(slope_degrees_from_grid(0.0, &grid), 0.0, epsilon = 1e-12);
    }

    #[rstest]
    fn east_west_ramp_yields_expected_slope() {
        // The divisor is the full central-difference span, 2 x 111000 m at
        // the equator; an equal rise gives a unit gradient, i.e. 45 degrees.
        let rise = 2.0 * METERS_PER_DEGREE;
        let grid = [[0.0, 0.0, rise]; 3];
        assert_relative_eq!(slope_degrees_from_grid(0.0, &grid), 45.0, epsilon = 1e-9);
    }

    #[rstest]
    fn modest_ramp_yields_fractional_slope() {
        // A 222 m rise over the same span is a gradient of 1e-3.
        let rise = 2.0 * METERS_PER_DEGREE * GRID_STEP_DEG;
        let grid = [[0.0, 0.0, rise]; 3];
        let expected = 1.0e-3_f64.atan().to_degrees();
        assert_relative_eq!(slope_degrees_from_grid(0.0, &grid), expected, epsilon = 1e-9);
    }

    #[rstest]
    fn latitude_shrinks_east_west_spacing() {
        let rise = 2.0 * METERS_PER_DEGREE * GRID_STEP_DEG;
        let grid = [[0.0, 0.0, rise]; 3];
        let at_equator = slope_degrees_from_grid(0.0, &grid);
        let at_sixty = slope_degrees_from_grid(60.0, &grid);
        assert!(at_sixty > at_equator);
    }

    #[rstest]
    fn grid_requires_all_nine_samples() {
        let mut elevations = vec![Some(10.0); 9];
        assert!(grid_from_results(&results(&elevations)).is_some());

        elevations[4] = None;
        assert!(grid_from_results(&results(&elevations)).is_none());

        assert!(grid_from_results(&results(&vec![Some(10.0); 8])).is_none());
    }

    #[rstest]
    fn grid_is_row_major() {
        let elevations: Vec<Option<f64>> = (0..9).map(|i| Some(f64::from(i))).collect();
        let grid = grid_from_results(&results(&elevations)).expect("complete grid");
        assert_eq!(grid[0], [0.0, 1.0, 2.0]);
        assert_eq!(grid[2], [6.0, 7.0, 8.0]);
    }

    #[rstest]
    fn deserialises_ok_response() {
        let json = r#"{
            "status": "OK",
            "results": [
                {"elevation": 515.0},
                {"elevation": null},
                {"elevation": 520.5}
            ]
        }"#;

        let response =
            ElevationClient::parse_response("http://example.com", json).expect("should parse");
        assert_eq!(response.results.len(), 3);
        assert_eq!(response.results[0].elevation, Some(515.0));
        assert_eq!(response.results[1].elevation, None);
    }

    #[rstest]
    fn error_status_is_a_service_error() {
        let json = r#"{"status": "INVALID_REQUEST", "error": "Too many locations"}"#;

        let err = ElevationClient::parse_response("http://example.com", json)
            .expect_err("should fail");
        assert!(matches!(err, SourceError::Service { message, .. } if message == "Too many locations"));
    }

    #[rstest]
    fn build_url_lists_nine_grid_points() {
        let cache = Arc::new(FetchCache::default());
        let client = ElevationClient::new(cache).expect("client should build");

        let url = client.build_url(Coord { x: 75.0, y: 22.0 });

        assert!(url.starts_with("https://api.opentopodata.org/v1/srtm90m?locations="));
        let location_count = url.matches("%7C").count() + 1;
        assert_eq!(location_count, 9);
        assert!(url.contains("21.999"));
        assert!(url.contains("22.001"));
    }
}
