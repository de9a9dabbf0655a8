//! Adaptive-radius nearest-feature resolution.
//!
//! A single bounding-box query cannot know in advance how far away the
//! nearest road or substation is. The resolver starts with a modest search
//! box and widens it geometrically until something is found or the radius
//! ceiling is reached; the answer is the haversine distance to the closest
//! returned position.

use async_trait::async_trait;
use geo::{Coord, Distance, Haversine, Point};
use log::debug;

use heliosite_core::{FeatureCategory, FeatureSource, SourceError};

use crate::overpass::{BoundingBox, BoundingBoxSource};

/// Great-circle distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b)) / 1000.0
}

/// Radius schedule for the adaptive search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchPolicy {
    /// First search radius, in kilometres.
    pub start_radius_km: f64,
    /// Multiplier applied after each empty result.
    pub growth_factor: f64,
    /// Radius ceiling; the search stops once a radius would exceed it.
    pub max_radius_km: f64,
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            start_radius_km: 20.0,
            growth_factor: 1.7,
            max_radius_km: 60.0,
        }
    }
}

impl SearchPolicy {
    /// The radii the resolver will try, in order.
    #[must_use]
    pub fn schedule(&self) -> Vec<f64> {
        let mut radii = Vec::new();
        let mut radius = self.start_radius_km;
        while radius <= self.max_radius_km {
            radii.push(radius);
            radius *= self.growth_factor;
        }
        radii
    }
}

/// Resolves the distance to the nearest feature of a category via a
/// widening sequence of bounding-box queries.
#[derive(Debug, Clone)]
pub struct NearestFeatureResolver<S> {
    source: S,
    policy: SearchPolicy,
}

impl<S> NearestFeatureResolver<S> {
    /// Wrap a bounding-box source with the default search policy.
    pub fn new(source: S) -> Self {
        Self::with_policy(source, SearchPolicy::default())
    }

    /// Wrap a bounding-box source with an explicit search policy.
    pub fn with_policy(source: S, policy: SearchPolicy) -> Self {
        Self { source, policy }
    }
}

#[async_trait]
impl<S> FeatureSource for NearestFeatureResolver<S>
where
    S: BoundingBoxSource,
{
    async fn nearest_distance_km(
        &self,
        point: Coord<f64>,
        category: FeatureCategory,
    ) -> Result<Option<f64>, SourceError> {
        for radius_km in self.policy.schedule() {
            let bbox = BoundingBox::around(point, radius_km);
            let positions = self.source.feature_positions(category, bbox).await?;
            let nearest = positions
                .into_iter()
                .map(|position| haversine_km(point, position))
                .min_by(f64::total_cmp);
            if let Some(distance) = nearest {
                return Ok(Some(distance));
            }
        }
        debug!(
            "no {category} found within {} km of ({}, {})",
            self.policy.max_radius_km, point.y, point.x
        );
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    /// Returns a scripted result for every query and counts the attempts.
    struct ScriptedSource {
        result: Result<Vec<Coord<f64>>, SourceError>,
        attempts: AtomicUsize,
    }

    impl ScriptedSource {
        fn returning(result: Result<Vec<Coord<f64>>, SourceError>) -> Self {
            Self {
                result,
                attempts: AtomicUsize::new(0),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BoundingBoxSource for &ScriptedSource {
        async fn feature_positions(
            &self,
            _category: FeatureCategory,
            _bbox: BoundingBox,
        ) -> Result<Vec<Coord<f64>>, SourceError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[rstest]
    fn default_schedule_has_three_radii() {
        let schedule = SearchPolicy::default().schedule();
        assert_eq!(schedule.len(), 3);
        assert_relative_eq!(schedule[0], 20.0, epsilon = 1e-12);
        assert_relative_eq!(schedule[1], 34.0, epsilon = 1e-12);
        assert_relative_eq!(schedule[2], 57.8, epsilon = 1e-9);
    }

    #[rstest]
    fn haversine_matches_known_distance() {
        // One tenth of a degree of latitude is ~11.12 km on the sphere.
        let a = Coord { x: 0.0, y: 0.0 };
        let b = Coord { x: 0.0, y: 0.1 };
        assert_relative_eq!(haversine_km(a, b), 11.119_49, epsilon = 1e-3);
    }

    #[tokio::test]
    async fn first_hit_resolves_to_nearest_feature() {
        let source = ScriptedSource::returning(Ok(vec![
            Coord { x: 0.0, y: 0.2 },
            Coord { x: 0.0, y: 0.1 },
        ]));
        let resolver = NearestFeatureResolver::new(&source);

        let distance = resolver
            .nearest_distance_km(Coord { x: 0.0, y: 0.0 }, FeatureCategory::Roads)
            .await
            .expect("query should succeed")
            .expect("features present");

        assert_relative_eq!(distance, 11.119_49, epsilon = 1e-3);
        assert_eq!(source.attempts(), 1);
    }

    #[tokio::test]
    async fn exhausted_schedule_yields_unknown() {
        let source = ScriptedSource::returning(Ok(Vec::new()));
        let resolver = NearestFeatureResolver::new(&source);

        let distance = resolver
            .nearest_distance_km(Coord { x: 0.0, y: 0.0 }, FeatureCategory::PowerGrid)
            .await
            .expect("query should succeed");

        assert!(distance.is_none());
        assert_eq!(source.attempts(), 3);
    }

    #[tokio::test]
    async fn query_errors_stop_the_search_immediately() {
        let source = ScriptedSource::returning(Err(SourceError::Http {
            url: "http://example.com".to_owned(),
            status: 504,
        }));
        let resolver = NearestFeatureResolver::new(&source);

        let err = resolver
            .nearest_distance_km(Coord { x: 0.0, y: 0.0 }, FeatureCategory::WaterBodies)
            .await
            .expect_err("query should fail");

        assert!(matches!(err, SourceError::Http { status: 504, .. }));
        assert_eq!(source.attempts(), 1);
    }
}
