//! Per-site normalized sub-criterion values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::SubCriterion;

/// Normalized `[0, 1]` contributions keyed by sub-criterion.
///
/// Values are clamped on insert. Sub-criteria absent from the map read as
/// 0.0, the least favourable contribution; absence is how the scoring
/// pipeline represents an unknown measurement.
///
/// # Examples
/// ```
/// use heliosite_core::{SiteValues, SubCriterion};
///
/// let values = SiteValues::new().with_value(SubCriterion::Slope, 1.3);
/// assert_eq!(values.get(SubCriterion::Slope), 1.0);
/// assert_eq!(values.get(SubCriterion::LandCost), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteValues {
    values: HashMap<SubCriterion, f64>,
}

impl SiteValues {
    /// Construct an empty value map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for a sub-criterion, defaulting to 0.0 when absent.
    #[must_use]
    pub fn get(&self, sub: SubCriterion) -> f64 {
        self.values.get(&sub).copied().unwrap_or(0.0)
    }

    /// Report whether a value has been recorded for a sub-criterion.
    #[must_use]
    pub fn contains(&self, sub: SubCriterion) -> bool {
        self.values.contains_key(&sub)
    }

    /// Insert or update a value, clamped into `0.0..=1.0`.
    ///
    /// NaN is recorded as 0.0, the unknown-measurement contribution; a
    /// clamp alone would let it poison the weighted sum.
    pub fn set(&mut self, sub: SubCriterion, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value };
        self.values.insert(sub, value.clamp(0.0, 1.0));
    }

    /// Insert a value while returning `self` for chaining.
    #[must_use]
    pub fn with_value(mut self, sub: SubCriterion, value: f64) -> Self {
        self.set(sub, value);
        self
    }

    /// Iterate over the recorded values.
    pub fn iter(&self) -> impl Iterator<Item = (SubCriterion, f64)> + '_ {
        self.values.iter().map(|(&sub, &value)| (sub, value))
    }

    /// Number of recorded values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Report whether no values have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
