//! The fixed criterion hierarchy used by the suitability model.
//!
//! Three main criteria each own an ordered set of sub-criteria (4/3/3). The
//! structure is static configuration: weights change at runtime, the
//! hierarchy does not.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A main criterion grouping related sub-criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    /// Engineering viability: solar resource, terrain, grid access, cost.
    Technical,
    /// Environmental constraints: land cover, protected areas, water.
    Environmental,
    /// Social factors: access, demand, population pressure.
    Social,
}

/// A scored sub-criterion within the hierarchy.
///
/// # Examples
/// ```
/// use heliosite_core::{Criterion, SubCriterion};
///
/// assert_eq!(SubCriterion::SolarRadiation.criterion(), Criterion::Technical);
/// assert_eq!(Criterion::Social.sub_criteria().len(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubCriterion {
    /// Mean daily global horizontal irradiance.
    SolarRadiation,
    /// Terrain slope; flatter sites are cheaper to build on.
    Slope,
    /// Distance to the nearest power line or substation.
    GridProximity,
    /// Land acquisition cost. No automatic source; manual entry only.
    LandCost,
    /// Desirability of the dominant land-use tag at the point.
    LandUse,
    /// Distance to the nearest protected area.
    ProtectedAreaDistance,
    /// Distance to the nearest water body.
    WaterBodyBuffer,
    /// Distance to the nearest road.
    RoadDistance,
    /// Distance to the nearest populated place.
    DemandCenterProximity,
    /// Population density. No automatic source; manual entry only.
    PopulationDensity,
}

impl Criterion {
    /// Every main criterion, in display order.
    pub const ALL: [Self; 3] = [Self::Technical, Self::Environmental, Self::Social];

    /// The sub-criteria owned by this criterion, in display order.
    #[must_use]
    pub const fn sub_criteria(self) -> &'static [SubCriterion] {
        match self {
            Self::Technical => &[
                SubCriterion::SolarRadiation,
                SubCriterion::Slope,
                SubCriterion::GridProximity,
                SubCriterion::LandCost,
            ],
            Self::Environmental => &[
                SubCriterion::LandUse,
                SubCriterion::ProtectedAreaDistance,
                SubCriterion::WaterBodyBuffer,
            ],
            Self::Social => &[
                SubCriterion::RoadDistance,
                SubCriterion::DemandCenterProximity,
                SubCriterion::PopulationDensity,
            ],
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Technical => "Technical",
            Self::Environmental => "Environmental",
            Self::Social => "Social",
        }
    }
}

impl SubCriterion {
    /// Every sub-criterion, grouped by owning criterion in display order.
    pub const ALL: [Self; 10] = [
        Self::SolarRadiation,
        Self::Slope,
        Self::GridProximity,
        Self::LandCost,
        Self::LandUse,
        Self::ProtectedAreaDistance,
        Self::WaterBodyBuffer,
        Self::RoadDistance,
        Self::DemandCenterProximity,
        Self::PopulationDensity,
    ];

    /// The main criterion owning this sub-criterion.
    #[must_use]
    pub const fn criterion(self) -> Criterion {
        match self {
            Self::SolarRadiation | Self::Slope | Self::GridProximity | Self::LandCost => {
                Criterion::Technical
            }
            Self::LandUse | Self::ProtectedAreaDistance | Self::WaterBodyBuffer => {
                Criterion::Environmental
            }
            Self::RoadDistance | Self::DemandCenterProximity | Self::PopulationDensity => {
                Criterion::Social
            }
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SolarRadiation => "Solar Radiation",
            Self::Slope => "Slope",
            Self::GridProximity => "Proximity to Grid",
            Self::LandCost => "Land Cost",
            Self::LandUse => "Land Use",
            Self::ProtectedAreaDistance => "Distance from Protected Areas",
            Self::WaterBodyBuffer => "Water Body Buffer",
            Self::RoadDistance => "Distance from Roads",
            Self::DemandCenterProximity => "Proximity to Demand Centers",
            Self::PopulationDensity => "Population Density",
        }
    }

    /// Stable machine-readable identifier, matching the serde encoding.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::SolarRadiation => "solar-radiation",
            Self::Slope => "slope",
            Self::GridProximity => "grid-proximity",
            Self::LandCost => "land-cost",
            Self::LandUse => "land-use",
            Self::ProtectedAreaDistance => "protected-area-distance",
            Self::WaterBodyBuffer => "water-body-buffer",
            Self::RoadDistance => "road-distance",
            Self::DemandCenterProximity => "demand-center-proximity",
            Self::PopulationDensity => "population-density",
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SubCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unrecognised sub-criterion key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sub-criterion: {0}")]
pub struct ParseSubCriterionError(String);

impl FromStr for SubCriterion {
    type Err = ParseSubCriterionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sub| sub.key() == s)
            .ok_or_else(|| ParseSubCriterionError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hierarchy_cardinalities_are_fixed() {
        assert_eq!(Criterion::Technical.sub_criteria().len(), 4);
        assert_eq!(Criterion::Environmental.sub_criteria().len(), 3);
        assert_eq!(Criterion::Social.sub_criteria().len(), 3);
        assert_eq!(SubCriterion::ALL.len(), 10);
    }

    #[rstest]
    fn every_sub_criterion_belongs_to_its_group() {
        for criterion in Criterion::ALL {
            for sub in criterion.sub_criteria() {
                assert_eq!(sub.criterion(), criterion);
            }
        }
    }

    #[rstest]
    #[case("solar-radiation", SubCriterion::SolarRadiation)]
    #[case("demand-center-proximity", SubCriterion::DemandCenterProximity)]
    fn parses_known_keys(#[case] key: &str, #[case] expected: SubCriterion) {
        assert_eq!(key.parse::<SubCriterion>().unwrap(), expected);
    }

    #[rstest]
    fn rejects_unknown_key() {
        assert!("wind-speed".parse::<SubCriterion>().is_err());
    }

    #[rstest]
    fn keys_round_trip_through_parse() {
        for sub in SubCriterion::ALL {
            assert_eq!(sub.key().parse::<SubCriterion>().unwrap(), sub);
        }
    }
}
