//! Point-in-sun queries against the buildings of the current area.

use crate::Vector;
use crate::building::Building;
use crate::config::ExposureConfig;
use crate::geo::PlanarPoint;
use crate::geom::ray::Ray;
use crate::geom::solid::OcclusionSolid;
use crate::venue::VenueId;
use rayon::prelude::*;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Occlusion model shared between query threads and a rare writer.
///
/// Queries take the read lock, [`OcclusionModel::set_buildings`] takes the write lock.
pub type SharedOcclusionModel = Arc<RwLock<OcclusionModel>>;

/// Owns the occlusion solids of one area and answers ray-casting queries.
#[derive(Debug, Clone)]
pub struct OcclusionModel {
    solids: Vec<OcclusionSolid>,
    table_height: f64,
    max_distance: f64,
}

impl OcclusionModel {
    pub fn new(config: &ExposureConfig) -> Self {
        Self {
            solids: Vec::new(),
            table_height: config.table_height,
            max_distance: config.max_ray_distance,
        }
    }

    pub fn into_shared(self) -> SharedOcclusionModel {
        Arc::new(RwLock::new(self))
    }

    /// Replaces all solids with the ones built from `buildings`.
    ///
    /// Buildings that cannot be extruded are skipped.
    /// Returns the number of solids in the model.
    pub fn set_buildings(&mut self, buildings: &[Building]) -> usize {
        self.solids.clear();

        let built: Vec<OcclusionSolid> = buildings
            .par_iter()
            .enumerate()
            .filter_map(
                |(i, b)| match OcclusionSolid::from_footprint(&b.footprint, b.height) {
                    Ok(solid) => Some(solid),
                    Err(e) => {
                        debug!("skipping building {i}: {e}");
                        None
                    }
                },
            )
            .collect();

        let skipped = buildings.len() - built.len();
        self.solids = built;
        info!(
            "Occlusion model rebuilt: {} solids, {} buildings skipped",
            self.solids.len(),
            skipped
        );
        self.solids.len()
    }

    pub fn solids(&self) -> &[OcclusionSolid] {
        &self.solids
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Returns true if nothing blocks the way from `point` toward the sun.
    ///
    /// The ray starts at table height above `point`. A sun at or below the
    /// horizon (`sun_dir.dy <= 0`) never lights anything.
    pub fn is_sunlit(&self, point: PlanarPoint, sun_dir: &Vector) -> bool {
        if !(sun_dir.dy > 0.) {
            return false;
        }
        let Some(ray) = Ray::new(point.at_height(self.table_height), *sun_dir) else {
            return false;
        };
        !self
            .solids
            .iter()
            .any(|solid| solid.blocks(&ray, self.max_distance))
    }

    /// Runs [`OcclusionModel::is_sunlit`] for every point in parallel.
    ///
    /// The output keeps the order of `points`.
    pub fn batch_check(
        &self,
        points: &[(VenueId, PlanarPoint)],
        sun_dir: &Vector,
    ) -> Vec<(VenueId, bool)> {
        points
            .par_iter()
            .map(|(id, p)| (id.clone(), self.is_sunlit(*p, sun_dir)))
            .collect()
    }
}

impl Default for OcclusionModel {
    fn default() -> Self {
        Self::new(&ExposureConfig::default())
    }
}
