//! Overpass (OpenStreetMap) client for spatial feature queries.
//!
//! Two query shapes are used: bounding-box feature searches feeding the
//! nearest-feature resolver, and a small fixed-radius land-use query reduced
//! to the most frequent `landuse` tag. Way and relation features carry a
//! centre position (`out center`), which stands in for the geometry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;
use reqwest::Client;
use serde::Deserialize;

use heliosite_core::{FeatureCategory, LandUseSource, SourceError};

use crate::cache::FetchCache;
use crate::http;
use crate::{ClientBuildError, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Default Overpass API endpoint.
pub const DEFAULT_OVERPASS_BASE_URL: &str = "https://overpass-api.de/api/interpreter";

/// Radius of the land-use neighbourhood query, in kilometres.
const LAND_USE_RADIUS_KM: f64 = 2.0;

/// Kilometres per degree of latitude; also used as the bounding-box
/// longitude approximation, matching the reference behaviour.
const KM_PER_DEGREE: f64 = 111.0;

/// A latitude/longitude extent for an Overpass bounding-box query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern latitude bound.
    pub south: f64,
    /// Western longitude bound.
    pub west: f64,
    /// Northern latitude bound.
    pub north: f64,
    /// Eastern longitude bound.
    pub east: f64,
}

impl BoundingBox {
    /// Build a box of `radius_km` half-extent around a point
    /// (`x` = longitude, `y` = latitude).
    #[must_use]
    pub fn around(point: Coord<f64>, radius_km: f64) -> Self {
        let delta = radius_km / KM_PER_DEGREE;
        Self {
            south: point.y - delta,
            west: point.x - delta,
            north: point.y + delta,
            east: point.x + delta,
        }
    }
}

impl fmt::Display for BoundingBox {
    /// Overpass bbox order: south, west, north, east.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

/// Fetch feature positions of a category within a bounding box.
///
/// The nearest-feature resolver drives its adaptive radius search through
/// this seam; tests substitute a scripted implementation.
#[async_trait]
pub trait BoundingBoxSource: Send + Sync {
    /// Positions of every matching feature inside `bbox`.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the query cannot be executed or its
    /// response cannot be decoded.
    async fn feature_positions(
        &self,
        category: FeatureCategory,
        bbox: BoundingBox,
    ) -> Result<Vec<Coord<f64>>, SourceError>;
}

/// Overpass QL selector for a feature category.
const fn selector(category: FeatureCategory) -> &'static str {
    match category {
        FeatureCategory::Roads => "way[highway]",
        FeatureCategory::PowerGrid => {
            "(way[power=line]; node[power=substation]; way[power=substation];)"
        }
        FeatureCategory::WaterBodies => {
            "(way[natural=water]; way[waterway=river]; relation[waterway=river];)"
        }
        FeatureCategory::ProtectedAreas => {
            "(relation[boundary=protected_area]; way[leisure=nature_reserve]; relation[leisure=nature_reserve];)"
        }
        FeatureCategory::DemandCenters => {
            "(node[place=city]; node[place=town]; node[place=village];)"
        }
    }
}

/// Overpass JSON response, reduced to the fields the client reads.
#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Center {
    lat: f64,
    lon: f64,
}

impl Element {
    /// Node position, or the centre for ways and relations.
    fn position(&self) -> Option<Coord<f64>> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some(Coord { x: lon, y: lat });
        }
        self.center
            .as_ref()
            .map(|center| Coord { x: center.lon, y: center.lat })
    }
}

/// Configuration for [`OverpassClient`].
#[derive(Debug, Clone)]
pub struct OverpassClientConfig {
    /// Overpass interpreter endpoint.
    pub base_url: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OverpassClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OVERPASS_BASE_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// HTTP client for the Overpass interpreter.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    cache: Arc<FetchCache>,
    config: OverpassClientConfig,
}

impl OverpassClient {
    /// Create a client with default configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build.
    pub fn new(cache: Arc<FetchCache>) -> Result<Self, ClientBuildError> {
        Self::with_config(cache, OverpassClientConfig::default())
    }

    /// Create a client with explicit configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client fails to build.
    pub fn with_config(
        cache: Arc<FetchCache>,
        config: OverpassClientConfig,
    ) -> Result<Self, ClientBuildError> {
        let client = http::build_client(&config.user_agent, config.timeout)?;
        Ok(Self {
            client,
            cache,
            config,
        })
    }

    /// Execute an Overpass QL query, caching by endpoint plus query text.
    async fn run_query(&self, query: String) -> Result<Arc<String>, SourceError> {
        let key = format!("{}?data={}", self.config.base_url, query);
        let client = self.client.clone();
        let url = self.config.base_url.clone();
        let timeout = self.config.timeout;
        self.cache
            .get_or_fetch(key, async move {
                http::post_form(&client, &url, "data", &query, timeout).await
            })
            .await
    }

    fn parse_response(url: &str, body: &str) -> Result<OverpassResponse, SourceError> {
        serde_json::from_str(body).map_err(|err| SourceError::Parse {
            url: url.to_owned(),
            message: err.to_string(),
        })
    }
}

/// Build the feature query for one category and bounding box.
fn feature_query(category: FeatureCategory, bbox: BoundingBox) -> String {
    format!(
        "[out:json][timeout:25];({}(bbox:{bbox}););out center 200;",
        selector(category)
    )
}

/// Build the land-use neighbourhood query.
fn land_use_query(bbox: BoundingBox) -> String {
    format!(
        "[out:json][timeout:25];(way[landuse](bbox:{bbox});relation[landuse](bbox:{bbox}););out tags center 150;"
    )
}

/// Most frequent `landuse` tag among the returned elements.
///
/// Ties break lexicographically so repeated queries stay deterministic.
fn dominant_tag(elements: &[Element]) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for element in elements {
        if let Some(tag) = element.tags.get("landuse") {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(tag, _)| tag.to_owned())
}

#[async_trait]
impl BoundingBoxSource for OverpassClient {
    async fn feature_positions(
        &self,
        category: FeatureCategory,
        bbox: BoundingBox,
    ) -> Result<Vec<Coord<f64>>, SourceError> {
        let body = self.run_query(feature_query(category, bbox)).await?;
        let response = Self::parse_response(&self.config.base_url, &body)?;
        Ok(response
            .elements
            .iter()
            .filter_map(Element::position)
            .collect())
    }
}

#[async_trait]
impl LandUseSource for OverpassClient {
    async fn dominant_land_use(&self, point: Coord<f64>) -> Result<Option<String>, SourceError> {
        let bbox = BoundingBox::around(point, LAND_USE_RADIUS_KM);
        let body = self.run_query(land_use_query(bbox)).await?;
        let response = Self::parse_response(&self.config.base_url, &body)?;
        Ok(dominant_tag(&response.elements))
    }
}
