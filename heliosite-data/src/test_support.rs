//! Scripted data-source doubles for tests.
//!
//! Each stub implements one of the source traits and replays a fixed
//! outcome, optionally after a delay so callers can exercise their timeout
//! handling.

use std::time::Duration;

use async_trait::async_trait;
use geo::Coord;

use heliosite_core::{
    FeatureCategory, FeatureSource, IrradianceSource, LandUseSource, SlopeSource, SourceError,
};

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// Scripted [`IrradianceSource`].
#[derive(Debug, Clone)]
pub struct StubIrradianceSource {
    outcome: Result<Option<f64>, SourceError>,
    delay: Option<Duration>,
}

impl StubIrradianceSource {
    /// Always answer with `value`.
    #[must_use]
    pub fn with_value(value: Option<f64>) -> Self {
        Self {
            outcome: Ok(value),
            delay: None,
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn with_error(error: SourceError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
        }
    }

    /// Wait for `delay` before answering.
    #[must_use]
    pub fn after_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl IrradianceSource for StubIrradianceSource {
    async fn mean_daily_irradiance(&self, _point: Coord<f64>) -> Result<Option<f64>, SourceError> {
        pause(self.delay).await;
        self.outcome.clone()
    }
}

/// Scripted [`SlopeSource`].
#[derive(Debug, Clone)]
pub struct StubSlopeSource {
    outcome: Result<Option<f64>, SourceError>,
    delay: Option<Duration>,
}

impl StubSlopeSource {
    /// Always answer with `value`.
    #[must_use]
    pub fn with_value(value: Option<f64>) -> Self {
        Self {
            outcome: Ok(value),
            delay: None,
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn with_error(error: SourceError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
        }
    }

    /// Wait for `delay` before answering.
    #[must_use]
    pub fn after_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SlopeSource for StubSlopeSource {
    async fn slope_degrees(&self, _point: Coord<f64>) -> Result<Option<f64>, SourceError> {
        pause(self.delay).await;
        self.outcome.clone()
    }
}

/// Scripted [`FeatureSource`] answering every category the same way.
#[derive(Debug, Clone)]
pub struct StubFeatureSource {
    outcome: Result<Option<f64>, SourceError>,
    delay: Option<Duration>,
}

impl StubFeatureSource {
    /// Always answer with `distance_km` for every category.
    #[must_use]
    pub fn with_value(distance_km: Option<f64>) -> Self {
        Self {
            outcome: Ok(distance_km),
            delay: None,
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn with_error(error: SourceError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
        }
    }

    /// Wait for `delay` before answering.
    #[must_use]
    pub fn after_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl FeatureSource for StubFeatureSource {
    async fn nearest_distance_km(
        &self,
        _point: Coord<f64>,
        _category: FeatureCategory,
    ) -> Result<Option<f64>, SourceError> {
        pause(self.delay).await;
        self.outcome.clone()
    }
}

/// Scripted [`LandUseSource`].
#[derive(Debug, Clone)]
pub struct StubLandUseSource {
    outcome: Result<Option<String>, SourceError>,
    delay: Option<Duration>,
}

impl StubLandUseSource {
    /// Always answer with `tag`.
    #[must_use]
    pub fn with_value(tag: Option<&str>) -> Self {
        Self {
            outcome: Ok(tag.map(str::to_owned)),
            delay: None,
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn with_error(error: SourceError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
        }
    }

    /// Wait for `delay` before answering.
    #[must_use]
    pub fn after_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl LandUseSource for StubLandUseSource {
    async fn dominant_land_use(&self, _point: Coord<f64>) -> Result<Option<String>, SourceError> {
        pause(self.delay).await;
        self.outcome.clone()
    }
}
