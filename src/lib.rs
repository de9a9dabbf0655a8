//! Facade crate for the Heliosite suitability engine.
//!
//! This crate re-exports the core domain types, the external data-source
//! clients, and the scoring engine so applications can depend on a single
//! crate.

#![forbid(unsafe_code)]

pub use heliosite_core::{
    Calibration, CalibrationWarning, Criterion, FeatureCategory, RawLayer, Recommendation,
    SiteValues, SourceError, SubCriterion, WeightSet, norm_benefit, norm_cost,
};

pub use heliosite_data::{
    ElevationClient, FetchCache, FetchCacheConfig, NearestFeatureResolver, OverpassClient,
    PowerClient,
};

pub use heliosite_scorer::{ManualOverrides, ScoringEngine, SiteAssessment, SiteSources};
