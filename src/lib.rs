//! Sun exposure of outdoor venues.
//!
//! Buildings around a fixed origin are extruded into solids in a local
//! planar frame (x east, y up, z south). The sun position comes from a
//! low-precision ephemeris. A venue is sunny when a ray from table height
//! toward the sun hits no solid, and a bounded forward search predicts when
//! that changes.

pub mod building;
pub mod config;
pub mod geo;
pub mod geom;
pub mod io;
pub mod occlusion;
pub mod predict;
pub mod session;
pub mod sun;
pub mod venue;

// Prelude
pub use building::{Building, Footprint, GeoBuilding, height_from_tags};
pub use config::ExposureConfig;
pub use geo::{GeoPoint, Origin, PlanarPoint, to_geo, to_planar};
pub use geom::point::Point;
pub use geom::solid::OcclusionSolid;
pub use geom::vector::Vector;
pub use occlusion::{OcclusionModel, SharedOcclusionModel};
pub use predict::{ExposurePredictor, Prediction};
pub use session::SunSession;
pub use sun::{DayTimes, SunPosition, day_times, sun_direction, sun_position};
pub use venue::{SunState, Venue, VenueId, VenueRegistry};
