//! Forward search for the next sun/shade transition of a venue.
//!
//! A sunny venue is sampled every `sunny_step_minutes` until it gets blocked
//! or the sun sets. If it stays lit over the whole horizon, the day's sunset
//! is reported. A shaded venue is sampled every `shaded_step_minutes` until
//! it becomes sunlit or the day's sunset passes. Each call starts from
//! scratch at `now`.

use crate::config::ExposureConfig;
use crate::geo::{Origin, PlanarPoint};
use crate::occlusion::OcclusionModel;
use crate::sun::{day_times, sun_position};
use crate::venue::{SunState, Venue, VenueId, VenueRegistry};
use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Current state of a venue plus its predicted next transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Prediction {
    pub state: SunState,
}

/// Combines the ephemeris with an occlusion model over a bounded time horizon.
pub struct ExposurePredictor<'a> {
    model: &'a OcclusionModel,
    config: &'a ExposureConfig,
}

impl<'a> ExposurePredictor<'a> {
    pub fn new(model: &'a OcclusionModel, config: &'a ExposureConfig) -> Self {
        Self { model, config }
    }

    /// Is the venue in the sun at instant `t`?
    ///
    /// The sun is computed at the origin; the area is small enough for one sun.
    pub fn is_sunlit_at(&self, point: PlanarPoint, origin: &Origin, t: DateTime<Utc>) -> bool {
        let pos = sun_position(t, origin.lat(), origin.lon());
        if !pos.is_above_horizon() {
            return false;
        }
        self.model.is_sunlit(point, &pos.direction())
    }

    /// Current state of `venue` at `now` and the time of its next flip.
    pub fn predict(&self, venue: &Venue, origin: &Origin, now: DateTime<Utc>) -> Prediction {
        let sunlit_now = self.is_sunlit_at(venue.planar, origin, now);
        self.predict_from(venue.planar, origin, now, sunlit_now)
    }

    /// Same as [`ExposurePredictor::predict`] with the state at `now` already known.
    pub fn predict_from(
        &self,
        point: PlanarPoint,
        origin: &Origin,
        now: DateTime<Utc>,
        sunlit_now: bool,
    ) -> Prediction {
        let sunset = day_times(now, origin.lat(), origin.lon()).sunset;
        let state = if sunlit_now {
            SunState::Sunny {
                shades_at: self.find_shade(point, origin, now, sunset),
            }
        } else {
            SunState::Shaded {
                sunny_at: self.find_sun(point, origin, now, sunset),
            }
        };
        Prediction { state }
    }

    /// Instants `now + k * step` for `k >= 1`, up to the horizon.
    fn steps(&self, now: DateTime<Utc>, step_minutes: i64) -> impl Iterator<Item = DateTime<Utc>> {
        let step = usize::try_from(step_minutes.max(1)).unwrap_or(1);
        (step_minutes.max(1)..=self.config.horizon_minutes)
            .step_by(step)
            .map(move |m| now + Duration::minutes(m))
    }

    fn find_shade(
        &self,
        point: PlanarPoint,
        origin: &Origin,
        now: DateTime<Utc>,
        sunset: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        for t in self.steps(now, self.config.sunny_step_minutes) {
            if let Some(sunset) = sunset.filter(|s| t > *s) {
                return Some(sunset);
            }
            let pos = sun_position(t, origin.lat(), origin.lon());
            if !pos.is_above_horizon() {
                return Some(t);
            }
            if !self.model.is_sunlit(point, &pos.direction()) {
                return Some(t);
            }
        }
        // Sunny through the whole horizon
        sunset
    }

    fn find_sun(
        &self,
        point: PlanarPoint,
        origin: &Origin,
        now: DateTime<Utc>,
        sunset: Option<DateTime<Utc>>,
    ) -> Option<DateTime<Utc>> {
        for t in self.steps(now, self.config.shaded_step_minutes) {
            if sunset.is_some_and(|s| t > s) {
                break;
            }
            let pos = sun_position(t, origin.lat(), origin.lon());
            if !pos.is_above_horizon() {
                continue;
            }
            if self.model.is_sunlit(point, &pos.direction()) {
                return Some(t);
            }
        }
        None
    }

    /// Predicts every venue of `registry` in parallel and stores the results.
    pub fn predict_all(&self, registry: &mut VenueRegistry, origin: &Origin, now: DateTime<Utc>) {
        let venues: Vec<&Venue> = registry.iter().collect();
        let results: Vec<(VenueId, SunState)> = venues
            .par_iter()
            .map(|v| (v.id.clone(), self.predict(v, origin, now).state))
            .collect();
        debug!("Predicted {} venues at {now}", results.len());
        for (id, state) in results {
            registry.set_sun_state(&id, state);
        }
    }
}
