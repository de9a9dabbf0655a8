//! Hierarchical AHP-style weight model.
//!
//! A [`WeightSet`] holds one weight per main criterion and one local weight
//! per sub-criterion. The global weight of a sub-criterion is the product of
//! the two; it is derived on demand rather than cached, so readers can never
//! observe a partially rebuilt table.
//!
//! Group sums of 1.0 are a policy the caller enforces (via
//! [`WeightSet::normalized`]); the model accepts drifted input and
//! [`WeightSet::score`] renormalises by the attainable maximum as a second
//! line of defence.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Criterion, SiteValues, SubCriterion};

/// Main- and sub-criterion weights for the suitability hierarchy.
///
/// # Examples
/// ```
/// use heliosite_core::{SiteValues, SubCriterion, WeightSet};
///
/// let weights = WeightSet::default();
/// let mut values = SiteValues::new();
/// for sub in SubCriterion::ALL {
///     values.set(sub, 1.0);
/// }
/// let score = weights.score(&values);
/// assert!((score - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    main: HashMap<Criterion, f64>,
    local: HashMap<SubCriterion, f64>,
}

impl Default for WeightSet {
    /// The reference weighting derived from the published AHP judgement
    /// matrices for solar-farm siting.
    fn default() -> Self {
        let main = HashMap::from([
            (Criterion::Technical, 0.693),
            (Criterion::Environmental, 0.187),
            (Criterion::Social, 0.080),
        ]);
        let local = HashMap::from([
            (SubCriterion::SolarRadiation, 0.558),
            (SubCriterion::Slope, 0.262),
            (SubCriterion::GridProximity, 0.130),
            (SubCriterion::LandCost, 0.050),
            (SubCriterion::LandUse, 0.258),
            (SubCriterion::ProtectedAreaDistance, 0.637),
            (SubCriterion::WaterBodyBuffer, 0.105),
            (SubCriterion::RoadDistance, 0.637),
            (SubCriterion::DemandCenterProximity, 0.258),
            (SubCriterion::PopulationDensity, 0.105),
        ]);
        Self { main, local }
    }
}

impl WeightSet {
    /// Construct the reference weighting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the weight of a main criterion.
    #[must_use]
    pub fn main_weight(&self, criterion: Criterion) -> f64 {
        self.main.get(&criterion).copied().unwrap_or(0.0)
    }

    /// Return the local weight of a sub-criterion within its group.
    #[must_use]
    pub fn local_weight(&self, sub: SubCriterion) -> f64 {
        self.local.get(&sub).copied().unwrap_or(0.0)
    }

    /// Assign a main-criterion weight.
    ///
    /// The model performs no cross-group validation; callers renormalise a
    /// triad before assignment (see [`WeightSet::normalized`]).
    pub fn set_main_weight(&mut self, criterion: Criterion, value: f64) {
        self.main.insert(criterion, value);
    }

    /// Assign a sub-criterion's local weight within its owning group.
    pub fn set_local_weight(&mut self, sub: SubCriterion, value: f64) {
        self.local.insert(sub, value);
    }

    /// The flattened global weight of a sub-criterion.
    ///
    /// Always `main × local`, computed from the current weights; there is no
    /// cached table to fall out of date.
    #[must_use]
    pub fn global_weight(&self, sub: SubCriterion) -> f64 {
        self.main_weight(sub.criterion()) * self.local_weight(sub)
    }

    /// Return a copy with every weight group rescaled to sum to 1.0.
    ///
    /// Groups summing to zero are left untouched; there is no meaningful
    /// renormalisation for them and [`WeightSet::score`] already treats the
    /// degenerate all-zero case as 0.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        let main_sum: f64 = Criterion::ALL.iter().map(|&c| self.main_weight(c)).sum();
        if main_sum > 0.0 {
            for criterion in Criterion::ALL {
                out.main.insert(criterion, self.main_weight(criterion) / main_sum);
            }
        }
        for criterion in Criterion::ALL {
            let subs = criterion.sub_criteria();
            let local_sum: f64 = subs.iter().map(|&s| self.local_weight(s)).sum();
            if local_sum > 0.0 {
                for &sub in subs {
                    out.local.insert(sub, self.local_weight(sub) / local_sum);
                }
            }
        }
        out
    }

    /// Compute the weighted suitability score for a set of site values.
    ///
    /// The weighted sum is divided by the attainable maximum (every input at
    /// 1.0) rather than assuming the global weights sum to exactly 1, so the
    /// score stays in `[0, 1]` under slight weight-sum drift. Missing
    /// sub-criteria in `values` contribute 0 (least favourable). An all-zero
    /// weight set scores 0.
    #[must_use]
    pub fn score(&self, values: &SiteValues) -> f64 {
        let mut total = 0.0;
        let mut max_sum = 0.0;
        for sub in SubCriterion::ALL {
            let weight = self.global_weight(sub);
            total += values.get(sub) * weight;
            max_sum += weight;
        }
        if max_sum > 0.0 { total / max_sum } else { 0.0 }
    }
}
