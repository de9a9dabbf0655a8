//! Normalization of raw measurements into `[0, 1]` contributions.
//!
//! Two transforms cover every numeric sub-criterion: [`norm_benefit`] for
//! higher-is-better measurements and [`norm_cost`] for lower-is-better ones.
//! The calibration band, not the formula, encodes desirability direction;
//! distances to both desirable and undesirable features use the cost
//! transform with an appropriately chosen band.
//!
//! Categorical land-use tags map through the lookup table carried by
//! [`Calibration`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SubCriterion;

/// Score applied to a land-use tag with no entry in the lookup table.
pub const NEUTRAL_LAND_USE_SCORE: f64 = 0.5;

/// Normalize a higher-is-better measurement against a calibration band.
///
/// Unknown measurements and degenerate bands (`lo == hi`) contribute 0.
///
/// # Examples
/// ```
/// use heliosite_core::norm_benefit;
///
/// assert_eq!(norm_benefit(Some(5.0), 3.0, 7.0), 0.5);
/// assert_eq!(norm_benefit(Some(9.0), 3.0, 7.0), 1.0);
/// assert_eq!(norm_benefit(None, 3.0, 7.0), 0.0);
/// assert_eq!(norm_benefit(Some(5.0), 4.0, 4.0), 0.0);
/// ```
#[must_use]
pub fn norm_benefit(x: Option<f64>, lo: f64, hi: f64) -> f64 {
    let Some(x) = x else { return 0.0 };
    if lo == hi {
        return 0.0;
    }
    ((x - lo) / (hi - lo)).clamp(0.0, 1.0)
}

/// Normalize a lower-is-better measurement against a calibration band.
///
/// The complement of [`norm_benefit`] for known measurements; unknown
/// measurements and degenerate bands still contribute 0 rather than 1.
///
/// # Examples
/// ```
/// use heliosite_core::norm_cost;
///
/// assert_eq!(norm_cost(Some(0.0), 0.0, 30.0), 1.0);
/// assert_eq!(norm_cost(None, 0.0, 30.0), 0.0);
/// ```
#[must_use]
pub fn norm_cost(x: Option<f64>, lo: f64, hi: f64) -> f64 {
    if x.is_none() || lo == hi {
        return 0.0;
    }
    1.0 - norm_benefit(x, lo, hi)
}

/// Inclusive calibration range for one sub-criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Measurement mapped to 0 (benefit) or 1 (cost).
    pub lo: f64,
    /// Measurement mapped to 1 (benefit) or 0 (cost).
    pub hi: f64,
}

impl Band {
    /// Construct a band.
    #[must_use]
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// A zero-width band cannot discriminate and always normalizes to 0.
    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.lo == self.hi
    }
}

/// A configuration problem worth surfacing to the controlling session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationWarning {
    /// A calibration band has zero width; its sub-criterion scores 0.
    #[error("calibration band for {sub} is degenerate ({lo} == {hi})")]
    DegenerateBand {
        /// Affected sub-criterion.
        sub: SubCriterion,
        /// Lower bound of the band.
        lo: f64,
        /// Upper bound of the band.
        hi: f64,
    },
    /// A land-use score lies outside `[0, 1]` and will be clamped.
    #[error("land-use score for tag {tag:?} is {score}, outside [0, 1]")]
    LandUseScoreOutOfRange {
        /// Affected land-use tag.
        tag: String,
        /// Configured score.
        score: f64,
    },
}

/// Caller-supplied calibration surface: one band per numeric sub-criterion
/// plus the land-use desirability table.
///
/// # Examples
/// ```
/// use heliosite_core::{Calibration, SubCriterion};
///
/// let calibration = Calibration::default();
/// let band = calibration.band(SubCriterion::SolarRadiation).unwrap();
/// assert_eq!((band.lo, band.hi), (3.0, 7.0));
/// assert_eq!(calibration.land_use_score(Some("farmland")), 0.8);
/// assert_eq!(calibration.land_use_score(Some("quarry")), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    bands: HashMap<SubCriterion, Band>,
    land_use: HashMap<String, f64>,
}

impl Default for Calibration {
    /// The reference calibration: irradiance 3–7 kWh/m²/day, slope 0–15°,
    /// a 30 km cap on every proximity distance, and the reference land-use
    /// scores.
    fn default() -> Self {
        let bands = HashMap::from([
            (SubCriterion::SolarRadiation, Band::new(3.0, 7.0)),
            (SubCriterion::Slope, Band::new(0.0, 15.0)),
            (SubCriterion::GridProximity, Band::new(0.0, 30.0)),
            (SubCriterion::ProtectedAreaDistance, Band::new(0.0, 30.0)),
            (SubCriterion::WaterBodyBuffer, Band::new(0.0, 30.0)),
            (SubCriterion::RoadDistance, Band::new(0.0, 30.0)),
            (SubCriterion::DemandCenterProximity, Band::new(0.0, 30.0)),
        ]);
        let land_use = [
            ("farmland", 0.8),
            ("industrial", 0.2),
            ("residential", 0.3),
            ("forest", 0.2),
            ("meadow", 0.6),
            ("grass", 0.6),
            ("brownfield", 0.7),
            ("greenfield", 0.9),
            ("commercial", 0.3),
            ("retail", 0.3),
        ]
        .into_iter()
        .map(|(tag, score)| (tag.to_owned(), score))
        .collect();
        Self { bands, land_use }
    }
}

impl Calibration {
    /// Return the calibration band for a sub-criterion, when one exists.
    ///
    /// Sub-criteria without an automatic raw source (population density,
    /// land cost) carry no band.
    #[must_use]
    pub fn band(&self, sub: SubCriterion) -> Option<Band> {
        self.bands.get(&sub).copied()
    }

    /// Insert or replace the band for a sub-criterion.
    pub fn set_band(&mut self, sub: SubCriterion, band: Band) {
        self.bands.insert(sub, band);
    }

    /// Look up the desirability score for a land-use tag.
    ///
    /// Unknown tags and absent measurements score the neutral
    /// [`NEUTRAL_LAND_USE_SCORE`]. Configured scores are clamped to `[0, 1]`.
    #[must_use]
    pub fn land_use_score(&self, tag: Option<&str>) -> f64 {
        tag.and_then(|t| self.land_use.get(t))
            .map_or(NEUTRAL_LAND_USE_SCORE, |&score| score.clamp(0.0, 1.0))
    }

    /// Insert or replace a land-use tag score.
    pub fn set_land_use_score(&mut self, tag: impl Into<String>, score: f64) {
        self.land_use.insert(tag.into(), score);
    }

    /// Surface configuration problems without rejecting the calibration.
    ///
    /// Degenerate bands silently zero their sub-criterion during scoring;
    /// the controlling session should display these warnings instead of
    /// discovering the zeros in the output.
    #[must_use]
    pub fn warnings(&self) -> Vec<CalibrationWarning> {
        let mut warnings: Vec<CalibrationWarning> = SubCriterion::ALL
            .iter()
            .filter_map(|&sub| {
                let band = self.bands.get(&sub)?;
                band.is_degenerate().then(|| CalibrationWarning::DegenerateBand {
                    sub,
                    lo: band.lo,
                    hi: band.hi,
                })
            })
            .collect();
        let mut tags: Vec<_> = self
            .land_use
            .iter()
            .filter(|&(_, &score)| !(0.0..=1.0).contains(&score))
            .collect();
        tags.sort_by(|a, b| a.0.cmp(b.0));
        warnings.extend(
            tags.into_iter()
                .map(|(tag, &score)| CalibrationWarning::LandUseScoreOutOfRange {
                    tag: tag.clone(),
                    score,
                }),
        );
        warnings
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some(5.0), 3.0, 7.0, 0.5)]
    #[case(Some(3.0), 3.0, 7.0, 0.0)]
    #[case(Some(7.0), 3.0, 7.0, 1.0)]
    #[case(Some(2.0), 3.0, 7.0, 0.0)]
    #[case(Some(8.5), 3.0, 7.0, 1.0)]
    fn benefit_examples(
        #[case] x: Option<f64>,
        #[case] lo: f64,
        #[case] hi: f64,
        #[case] expected: f64,
    ) {
        assert_relative_eq!(norm_benefit(x, lo, hi), expected, epsilon = 1e-12);
    }

    #[rstest]
    fn slope_example_from_reference() {
        // 10 degrees against [0, 15]: cost = 1 - 10/15.
        assert_relative_eq!(
            norm_cost(Some(10.0), 0.0, 15.0),
            1.0 - 10.0 / 15.0,
            epsilon = 1e-12
        );
    }

    #[rstest]
    fn unknown_contributes_zero_through_both_transforms() {
        assert_eq!(norm_benefit(None, 0.0, 30.0), 0.0);
        assert_eq!(norm_cost(None, 0.0, 30.0), 0.0);
    }

    #[rstest]
    fn degenerate_band_contributes_zero_through_both_transforms() {
        assert_eq!(norm_benefit(Some(4.0), 4.0, 4.0), 0.0);
        assert_eq!(norm_cost(Some(4.0), 4.0, 4.0), 0.0);
    }

    proptest! {
        #[test]
        fn cost_is_complement_of_benefit(
            x in -1e6_f64..1e6,
            lo in -1e3_f64..1e3,
            width in 1e-3_f64..1e3,
        ) {
            let hi = lo + width;
            let benefit = norm_benefit(Some(x), lo, hi);
            let cost = norm_cost(Some(x), lo, hi);
            prop_assert!((cost - (1.0 - benefit)).abs() < 1e-12);
        }

        #[test]
        fn benefit_stays_in_unit_interval(
            x in -1e6_f64..1e6,
            lo in -1e3_f64..1e3,
            width in 1e-3_f64..1e3,
        ) {
            let value = norm_benefit(Some(x), lo, lo + width);
            prop_assert!((0.0..=1.0).contains(&value));
        }
    }

    #[rstest]
    fn unknown_land_use_tag_scores_neutral() {
        let calibration = Calibration::default();
        assert_eq!(calibration.land_use_score(None), NEUTRAL_LAND_USE_SCORE);
        assert_eq!(
            calibration.land_use_score(Some("military")),
            NEUTRAL_LAND_USE_SCORE
        );
    }

    #[rstest]
    fn configured_land_use_scores_apply() {
        let mut calibration = Calibration::default();
        calibration.set_land_use_score("quarry", 0.2);
        assert_eq!(calibration.land_use_score(Some("quarry")), 0.2);
        assert_eq!(calibration.land_use_score(Some("greenfield")), 0.9);
    }

    #[rstest]
    fn out_of_range_land_use_score_is_clamped_and_warned() {
        let mut calibration = Calibration::default();
        calibration.set_land_use_score("orchard", 1.4);
        assert_eq!(calibration.land_use_score(Some("orchard")), 1.0);
        assert!(calibration.warnings().iter().any(|w| matches!(
            w,
            CalibrationWarning::LandUseScoreOutOfRange { tag, .. } if tag == "orchard"
        )));
    }

    #[rstest]
    fn out_of_range_land_use_warnings_list_every_tag_in_order() {
        let mut calibration = Calibration::default();
        calibration.set_land_use_score("quarry", -0.5);
        calibration.set_land_use_score("orchard", 1.4);
        calibration.set_land_use_score("vineyard", 0.6);

        let tags: Vec<_> = calibration
            .warnings()
            .into_iter()
            .filter_map(|warning| match warning {
                CalibrationWarning::LandUseScoreOutOfRange { tag, .. } => Some(tag),
                CalibrationWarning::DegenerateBand { .. } => None,
            })
            .collect();

        assert_eq!(tags, ["orchard", "quarry"]);
    }

    #[rstest]
    fn degenerate_band_is_surfaced_as_warning() {
        let mut calibration = Calibration::default();
        assert!(calibration.warnings().is_empty());
        calibration.set_band(SubCriterion::Slope, Band::new(5.0, 5.0));
        let warnings = calibration.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            CalibrationWarning::DegenerateBand {
                sub: SubCriterion::Slope,
                ..
            }
        ));
    }

    #[rstest]
    fn manual_only_sub_criteria_have_no_band() {
        let calibration = Calibration::default();
        assert!(calibration.band(SubCriterion::PopulationDensity).is_none());
        assert!(calibration.band(SubCriterion::LandCost).is_none());
        assert!(calibration.band(SubCriterion::LandUse).is_none());
    }
}
