//! Raw per-point measurements fetched from the external data sources.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SubCriterion;

/// A category of spatial feature resolved to a nearest-instance distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureCategory {
    /// Highways of any class.
    Roads,
    /// Power lines and substations.
    PowerGrid,
    /// Lakes, rivers, and other water bodies.
    WaterBodies,
    /// Protected areas and nature reserves.
    ProtectedAreas,
    /// Cities, towns, and villages acting as demand centres.
    DemandCenters,
}

impl FeatureCategory {
    /// Every resolvable category.
    pub const ALL: [Self; 5] = [
        Self::Roads,
        Self::PowerGrid,
        Self::WaterBodies,
        Self::ProtectedAreas,
        Self::DemandCenters,
    ];

    /// The sub-criterion fed by this category's nearest distance.
    #[must_use]
    pub const fn sub_criterion(self) -> SubCriterion {
        match self {
            Self::Roads => SubCriterion::RoadDistance,
            Self::PowerGrid => SubCriterion::GridProximity,
            Self::WaterBodies => SubCriterion::WaterBodyBuffer,
            Self::ProtectedAreas => SubCriterion::ProtectedAreaDistance,
            Self::DemandCenters => SubCriterion::DemandCenterProximity,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Roads => "roads",
            Self::PowerGrid => "power grid",
            Self::WaterBodies => "water bodies",
            Self::ProtectedAreas => "protected areas",
            Self::DemandCenters => "demand centers",
        }
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw physical measurements for one point, fetched once per assessment.
///
/// Every field is optional: a `None` records that the measurement is
/// unknown, whether the source was unreachable, returned nothing, or the
/// resolver exhausted its search radius. The layer is immutable once the
/// fan-out completes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawLayer {
    /// Mean daily global horizontal irradiance, kWh/m²/day.
    pub irradiance: Option<f64>,
    /// Terrain slope at the point, degrees.
    pub slope_deg: Option<f64>,
    /// Nearest-feature distances in kilometres, keyed by category.
    pub distances_km: HashMap<FeatureCategory, f64>,
    /// Dominant land-use tag around the point.
    pub land_use: Option<String>,
}

impl RawLayer {
    /// Return the nearest-feature distance for a category, when known.
    #[must_use]
    pub fn distance_km(&self, category: FeatureCategory) -> Option<f64> {
        self.distances_km.get(&category).copied()
    }

    /// Count the measurements that resolved to a value.
    #[must_use]
    pub fn known_fields(&self) -> usize {
        usize::from(self.irradiance.is_some())
            + usize::from(self.slope_deg.is_some())
            + usize::from(self.land_use.is_some())
            + self.distances_km.len()
    }
}
