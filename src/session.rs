//! Host-facing driver: push an instant, pull the venue states.
//!
//! A session has no timers. The host calls [`SunSession::refresh`] with
//! whatever instant it wants to show (wall clock or a simulated time).

use crate::building::{Building, GeoBuilding};
use crate::config::ExposureConfig;
use crate::geo::Origin;
use crate::io::overpass::OverpassResponse;
use crate::occlusion::OcclusionModel;
use crate::predict::ExposurePredictor;
use crate::sun::{DayTimes, SunPosition, day_times, sun_position};
use crate::venue::{SunState, Venue, VenueId, VenueRegistry};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::info;

pub struct SunSession {
    origin: Origin,
    config: ExposureConfig,
    buildings: Vec<GeoBuilding>,
    model: OcclusionModel,
    venues: VenueRegistry,
}

impl SunSession {
    pub fn new(origin: Origin, config: ExposureConfig) -> Result<Self> {
        config.validate()?;
        let model = OcclusionModel::new(&config);
        Ok(Self {
            origin,
            config,
            buildings: Vec::new(),
            model,
            venues: VenueRegistry::new(),
        })
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    pub fn model(&self) -> &OcclusionModel {
        &self.model
    }

    pub fn venues(&self) -> &VenueRegistry {
        &self.venues
    }

    /// Moves the session to a new area anchor.
    ///
    /// Buildings and venues are projected again and all states become unknown.
    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = origin;
        self.rebuild_model();
        self.venues.reproject(&self.origin);
    }

    /// Replaces the building set. Returns the number of solids built.
    pub fn load_buildings(&mut self, buildings: Vec<GeoBuilding>) -> usize {
        self.buildings = buildings;
        let n = self.rebuild_model();
        self.venues.reset_states();
        n
    }

    pub fn load_venues(&mut self, venues: Vec<Venue>) {
        self.venues.replace_all(venues, &self.origin);
    }

    /// Loads buildings and venues from one Overpass response.
    pub fn load_overpass(&mut self, response: &OverpassResponse) -> (usize, usize) {
        let solids = self.load_buildings(response.buildings(self.config.default_building_height));
        self.load_venues(response.venues());
        (solids, self.venues.len())
    }

    fn rebuild_model(&mut self) -> usize {
        let projected: Vec<Building> = self
            .buildings
            .iter()
            .filter_map(|b| b.project(&self.origin))
            .collect();
        self.model.set_buildings(&projected)
    }

    /// Sun position at the origin.
    pub fn sun_position(&self, now: DateTime<Utc>) -> SunPosition {
        sun_position(now, self.origin.lat(), self.origin.lon())
    }

    pub fn day_times(&self, now: DateTime<Utc>) -> DayTimes {
        day_times(now, self.origin.lat(), self.origin.lon())
    }

    /// Computes the state of every venue at `now` with its next transition.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> &VenueRegistry {
        let sun = self.sun_position(now);
        let points = self.venues.positions();
        let lit: Vec<(VenueId, bool)> = if sun.is_above_horizon() {
            self.model.batch_check(&points, &sun.direction())
        } else {
            points.into_iter().map(|(id, _)| (id, false)).collect()
        };

        let predictor = ExposurePredictor::new(&self.model, &self.config);
        let states: Vec<(VenueId, SunState)> = lit
            .into_par_iter()
            .filter_map(|(id, sunlit)| {
                let venue = self.venues.get(&id)?;
                let prediction = predictor.predict_from(venue.planar, &self.origin, now, sunlit);
                Some((id, prediction.state))
            })
            .collect();

        for (id, state) in states {
            self.venues.set_sun_state(&id, state);
        }
        info!(
            "Refreshed {} venues at {now}: {} sunny, {} shaded",
            self.venues.len(),
            self.venues.sunny().len(),
            self.venues.shaded().len()
        );
        &self.venues
    }
}
