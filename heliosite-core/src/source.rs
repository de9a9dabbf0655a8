//! Async traits seaming the core off from the external data sources.
//!
//! Each trait covers one raw layer: irradiance, slope, nearest-feature
//! distance, and land use. Implementations live in `heliosite-data`; tests
//! stub them. Every method distinguishes "the source answered but has no
//! value" (`Ok(None)`) from a transport or protocol failure
//! (`Err(SourceError)`). The scoring engine converts both to an unknown
//! measurement, so neither can cross into the weight model.

use async_trait::async_trait;
use geo::Coord;
use thiserror::Error;

use crate::FeatureCategory;

/// Errors raised at an external data-source boundary.
///
/// Cloneable so a single in-flight failure can be shared with every caller
/// coalesced onto the same cached request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The request exceeded its deadline.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The request failed below the HTTP layer.
    #[error("network error for {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service answered with a non-success status.
    #[error("{url} returned HTTP status {status}")]
    Http {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// The service answered but reported an application-level error.
    #[error("service error from {url}: {message}")]
    Service {
        /// Requested URL.
        url: String,
        /// Error message reported by the service.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response from {url}: {message}")]
    Parse {
        /// Requested URL.
        url: String,
        /// Decoder error description.
        message: String,
    },
}

/// Source of mean daily global horizontal irradiance.
#[async_trait]
pub trait IrradianceSource: Send + Sync {
    /// Mean daily irradiance (kWh/m²/day) over the source's trailing
    /// window at `point` (`x` = longitude, `y` = latitude).
    ///
    /// Returns `Ok(None)` when the series holds no usable samples.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the upstream service cannot be reached
    /// or its response cannot be decoded.
    async fn mean_daily_irradiance(&self, point: Coord<f64>) -> Result<Option<f64>, SourceError>;
}

/// Source of terrain slope derived from an elevation grid.
#[async_trait]
pub trait SlopeSource: Send + Sync {
    /// Slope at `point` in degrees.
    ///
    /// Returns `Ok(None)` when the elevation grid is incomplete; a single
    /// missing sample invalidates the whole computation.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the upstream service cannot be reached
    /// or its response cannot be decoded.
    async fn slope_degrees(&self, point: Coord<f64>) -> Result<Option<f64>, SourceError>;
}

/// Source of nearest-feature distances per category.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    /// Distance in kilometres from `point` to the nearest feature of
    /// `category`.
    ///
    /// Returns `Ok(None)` when no feature exists within the source's
    /// maximum search radius (resolver exhaustion).
    ///
    /// # Errors
    /// Returns [`SourceError`] on the first transport or parse failure;
    /// the search is not retried on error, only on an empty result.
    async fn nearest_distance_km(
        &self,
        point: Coord<f64>,
        category: FeatureCategory,
    ) -> Result<Option<f64>, SourceError>;
}

/// Source of the dominant land-use tag around a point.
#[async_trait]
pub trait LandUseSource: Send + Sync {
    /// The most frequent land-use tag near `point`, when any polygon is
    /// tagged.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the upstream service cannot be reached
    /// or its response cannot be decoded.
    async fn dominant_land_use(&self, point: Coord<f64>) -> Result<Option<String>, SourceError>;
}
