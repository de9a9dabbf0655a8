//! External data-source clients for the Heliosite suitability engine.
//!
//! Each client implements one of the source traits from `heliosite-core`:
//!
//! - [`PowerClient`] — NASA POWER daily irradiance.
//! - [`ElevationClient`] — OpenTopoData elevation grid, reduced to a slope.
//! - [`OverpassClient`] — OpenStreetMap Overpass bounding-box queries and
//!   the dominant land-use tag.
//! - [`NearestFeatureResolver`] — the adaptive expanding-radius search over
//!   a bounding-box source.
//!
//! All HTTP traffic flows through a shared [`FetchCache`], which bounds the
//! call rate against the public, rate-limited upstream services and
//! coalesces concurrent identical requests.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod cache;
pub mod elevation;
mod http;
pub mod overpass;
pub mod power;
pub mod resolver;

#[doc(hidden)]
pub mod test_support;

pub use cache::{FetchCache, FetchCacheConfig};
pub use elevation::{ElevationClient, ElevationClientConfig};
pub use overpass::{BoundingBox, BoundingBoxSource, OverpassClient, OverpassClientConfig};
pub use power::{PowerClient, PowerClientConfig};
pub use resolver::{NearestFeatureResolver, SearchPolicy, haversine_km};

/// Default user agent sent by every client.
pub const DEFAULT_USER_AGENT: &str = "heliosite/0.1";

/// Default request timeout in seconds.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 25;

/// Error type for client construction failures.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// A configured base URL could not be parsed.
    #[error("invalid base URL {url:?}: {source}")]
    BaseUrl {
        /// Offending URL string.
        url: String,
        /// Source error from the URL parser.
        #[source]
        source: url::ParseError,
    },
}
