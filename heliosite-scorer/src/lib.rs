//! Site assessment: concurrent raw-layer fetch, normalization, and scoring.
//!
//! The [`ScoringEngine`] fans out to every configured data source at once,
//! isolates each field's failures and timeouts, normalizes the surviving
//! measurements through the calibration, applies any manual overrides, and
//! reduces the result to a weighted score with a recommendation band.

#![forbid(unsafe_code)]

mod engine;
mod overrides;

pub use engine::{ScoringEngine, SiteAssessment, SiteSources, build_site_values};
pub use overrides::ManualOverrides;
