//! The scoring engine: concurrent fetch fan-out and score assembly.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use geo::Coord;
use log::warn;
use serde::Serialize;
use tokio::time::timeout;

use heliosite_core::{
    Calibration, FeatureCategory, FeatureSource, IrradianceSource, LandUseSource, RawLayer,
    Recommendation, SiteValues, SlopeSource, SourceError, SubCriterion, WeightSet, norm_benefit,
    norm_cost,
};

use crate::ManualOverrides;

/// Default ceiling on any single field's fetch, in seconds.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 25;

/// The four data sources an assessment draws on.
#[derive(Clone)]
pub struct SiteSources {
    /// Mean daily irradiance.
    pub irradiance: Arc<dyn IrradianceSource>,
    /// Terrain slope.
    pub slope: Arc<dyn SlopeSource>,
    /// Nearest-feature distances.
    pub features: Arc<dyn FeatureSource>,
    /// Dominant land-use tag.
    pub land_use: Arc<dyn LandUseSource>,
}

/// The full outcome of assessing one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteAssessment {
    /// Latitude of the assessed point, degrees.
    pub latitude: f64,
    /// Longitude of the assessed point, degrees.
    pub longitude: f64,
    /// Raw measurements as fetched, before normalization.
    pub raw_layer: RawLayer,
    /// Normalized per-sub-criterion values, overrides applied.
    pub site_values: SiteValues,
    /// Weighted suitability score in `[0, 1]`.
    pub score: f64,
    /// Recommendation band for the score.
    pub recommendation: Recommendation,
}

/// Assesses points against a weight model and calibration.
///
/// All sources are queried concurrently; a failing or slow source costs its
/// own field, never the assessment. The engine holds its configuration by
/// value and is cheap to clone.
#[derive(Clone)]
pub struct ScoringEngine {
    sources: SiteSources,
    weights: WeightSet,
    calibration: Calibration,
    fetch_timeout: Duration,
}

impl ScoringEngine {
    /// Build an engine over `sources` with the reference weights and
    /// calibration.
    #[must_use]
    pub fn new(sources: SiteSources) -> Self {
        Self {
            sources,
            weights: WeightSet::default(),
            calibration: Calibration::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    /// Replace the weight model.
    #[must_use]
    pub fn with_weights(mut self, weights: WeightSet) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the calibration.
    #[must_use]
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    /// Set the per-field fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Mutable access to the weight model, for interactive adjustment.
    pub fn weights_mut(&mut self) -> &mut WeightSet {
        &mut self.weights
    }

    /// The current weight model.
    #[must_use]
    pub fn weights(&self) -> &WeightSet {
        &self.weights
    }

    /// Mutable access to the calibration.
    pub fn calibration_mut(&mut self) -> &mut Calibration {
        &mut self.calibration
    }

    /// The current calibration.
    #[must_use]
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Await one field's fetch, converting failure and timeout to unknown.
    async fn field<T, F>(&self, name: &str, fetch: F) -> Option<T>
    where
        F: Future<Output = Result<Option<T>, SourceError>>,
    {
        match timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(value)) => value,
            Ok(Err(err)) => {
                warn!("{name} lookup failed: {err}");
                None
            }
            Err(_) => {
                warn!(
                    "{name} lookup exceeded {}s; treating as unknown",
                    self.fetch_timeout.as_secs()
                );
                None
            }
        }
    }

    /// Fetch every raw measurement for `point` concurrently.
    ///
    /// Each of the eight fields is independently bounded by the fetch
    /// timeout; a failure or timeout leaves that field unknown and the rest
    /// intact.
    pub async fn fetch_raw_layer(&self, point: Coord<f64>) -> RawLayer {
        let distance = |category: FeatureCategory| {
            self.field(
                category.label(),
                self.sources.features.nearest_distance_km(point, category),
            )
        };

        let (irradiance, slope_deg, land_use, roads, grid, water, protected, demand) = tokio::join!(
            self.field(
                "irradiance",
                self.sources.irradiance.mean_daily_irradiance(point),
            ),
            self.field("slope", self.sources.slope.slope_degrees(point)),
            self.field("land use", self.sources.land_use.dominant_land_use(point)),
            distance(FeatureCategory::Roads),
            distance(FeatureCategory::PowerGrid),
            distance(FeatureCategory::WaterBodies),
            distance(FeatureCategory::ProtectedAreas),
            distance(FeatureCategory::DemandCenters),
        );

        let mut layer = RawLayer {
            irradiance,
            slope_deg,
            land_use,
            ..RawLayer::default()
        };
        let resolved = [
            (FeatureCategory::Roads, roads),
            (FeatureCategory::PowerGrid, grid),
            (FeatureCategory::WaterBodies, water),
            (FeatureCategory::ProtectedAreas, protected),
            (FeatureCategory::DemandCenters, demand),
        ];
        for (category, distance_km) in resolved {
            if let Some(distance_km) = distance_km {
                layer.distances_km.insert(category, distance_km);
            }
        }
        layer
    }

    /// Fetch, normalize, and score one point.
    pub async fn assess(&self, point: Coord<f64>, overrides: &ManualOverrides) -> SiteAssessment {
        for warning in self.calibration.warnings() {
            warn!("{warning}");
        }
        let raw_layer = self.fetch_raw_layer(point).await;
        let site_values = build_site_values(&raw_layer, overrides, &self.calibration);
        let score = self.weights.score(&site_values);
        SiteAssessment {
            latitude: point.y,
            longitude: point.x,
            raw_layer,
            site_values,
            score,
            recommendation: Recommendation::from_score(score),
        }
    }
}

/// The automatically derived value for one sub-criterion.
///
/// Sub-criteria without an automatic source (population density, land cost)
/// derive 0 and rely on overrides.
fn auto_value(sub: SubCriterion, raw: &RawLayer, calibration: &Calibration) -> f64 {
    let banded_cost = |measurement: Option<f64>| {
        calibration
            .band(sub)
            .map_or(0.0, |band| norm_cost(measurement, band.lo, band.hi))
    };
    match sub {
        SubCriterion::SolarRadiation => calibration
            .band(sub)
            .map_or(0.0, |band| norm_benefit(raw.irradiance, band.lo, band.hi)),
        SubCriterion::Slope => banded_cost(raw.slope_deg),
        SubCriterion::GridProximity => banded_cost(raw.distance_km(FeatureCategory::PowerGrid)),
        SubCriterion::RoadDistance => banded_cost(raw.distance_km(FeatureCategory::Roads)),
        SubCriterion::WaterBodyBuffer => banded_cost(raw.distance_km(FeatureCategory::WaterBodies)),
        SubCriterion::ProtectedAreaDistance => {
            banded_cost(raw.distance_km(FeatureCategory::ProtectedAreas))
        }
        SubCriterion::DemandCenterProximity => {
            banded_cost(raw.distance_km(FeatureCategory::DemandCenters))
        }
        SubCriterion::LandUse => calibration.land_use_score(raw.land_use.as_deref()),
        SubCriterion::PopulationDensity | SubCriterion::LandCost => 0.0,
    }
}

/// Normalize a raw layer into site values, applying manual overrides.
///
/// Every sub-criterion receives an explicit value. A parseable override
/// replaces the automatic value; an unparseable one is reported and the
/// automatic value stands.
#[must_use]
pub fn build_site_values(
    raw: &RawLayer,
    overrides: &ManualOverrides,
    calibration: &Calibration,
) -> SiteValues {
    let mut values = SiteValues::new();
    for sub in SubCriterion::ALL {
        let auto = auto_value(sub, raw, calibration);
        let value = match (overrides.raw(sub), overrides.parsed(sub)) {
            (_, Some(parsed)) => parsed,
            (Some(text), None) => {
                warn!("override for {sub} ({text:?}) is not a number; keeping the automatic value");
                auto
            }
            (None, None) => auto,
        };
        values.set(sub, value);
    }
    values
}
