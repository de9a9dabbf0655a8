//! Core domain types for the Heliosite suitability engine.
//!
//! The crate models the hierarchical multi-criteria weighting scheme used to
//! score a geographic point for solar-farm siting: a fixed criterion
//! hierarchy, a mutable [`WeightSet`], the normalization layer that turns raw
//! physical measurements into comparable `[0, 1]` contributions, and the
//! ordinal recommendation bands applied to the final score.
//!
//! External measurements reach the core through the async source traits in
//! [`source`]. Transport and parse failures stay typed as [`SourceError`]
//! at that seam; the scoring layer demotes them to unknown measurements, so
//! an upstream outage can never masquerade as a real zero.

#![forbid(unsafe_code)]

mod criteria;
mod layer;
mod normalize;
mod recommend;
pub mod source;
mod values;
mod weights;

pub use criteria::{Criterion, ParseSubCriterionError, SubCriterion};
pub use layer::{FeatureCategory, RawLayer};
pub use normalize::{
    Band, Calibration, CalibrationWarning, NEUTRAL_LAND_USE_SCORE, norm_benefit, norm_cost,
};
pub use recommend::Recommendation;
pub use source::{FeatureSource, IrradianceSource, LandUseSource, SlopeSource, SourceError};
pub use values::SiteValues;
pub use weights::WeightSet;
