//! Geodetic coordinates and the local tangent-plane frame.
//!
//! Positions are projected onto a flat plane around a fixed [`Origin`] with a
//! local equirectangular approximation. The planar frame uses meters with
//! `x` pointing east and `z` pointing south; the third axis of the 3D frame
//! (`y`) points up. The approximation is only meant for distances of a few
//! kilometers around the origin.

use crate::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in meters (haversine formula).
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lon / 2.).sin().powi(2);
        let c = 2. * a.sqrt().atan2((1. - a).sqrt());
        EARTH_RADIUS * c
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6);
        write!(f, "({:.prec$}, {:.prec$})", self.lat, self.lon, prec = prec)
    }
}

/// Anchor of the local planar frame.
///
/// Set once per session or search area and never moved; a new area gets a new origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin(GeoPoint);

impl Origin {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self(GeoPoint::new(lat, lon))
    }

    pub fn geo(&self) -> GeoPoint {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.0.lat
    }

    pub fn lon(&self) -> f64 {
        self.0.lon
    }

    /// Projects a geodetic point onto this origin's plane.
    pub fn to_planar(&self, geo: GeoPoint) -> PlanarPoint {
        to_planar(self, geo)
    }

    /// Inverse of [`Origin::to_planar`].
    pub fn to_geo(&self, planar: PlanarPoint) -> GeoPoint {
        to_geo(self, planar)
    }
}

impl From<GeoPoint> for Origin {
    fn from(value: GeoPoint) -> Self {
        Self(value)
    }
}

/// Ground-plane position relative to an [`Origin`], in meters.
///
/// `x` is east, `z` is south.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub z: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Lifts the point to the given height above ground.
    pub fn at_height(&self, y: f64) -> Point {
        Point::new(self.x, y, self.z)
    }

    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.z.is_finite()
    }
}

/// Projects `geo` onto the tangent plane at `origin`.
///
/// ```text
/// x =  (lon - lon0) * pi/180 * R * cos(lat0)
/// z = -(lat - lat0) * pi/180 * R
/// ```
pub fn to_planar(origin: &Origin, geo: GeoPoint) -> PlanarPoint {
    let d_lat = (geo.lat - origin.lat()) * PI / 180.;
    let d_lon = (geo.lon - origin.lon()) * PI / 180.;
    let x = d_lon * EARTH_RADIUS * (origin.lat() * PI / 180.).cos();
    let z = -d_lat * EARTH_RADIUS; // latitude grows northward, z grows southward
    PlanarPoint { x, z }
}

/// Unprojects a planar point back to latitude and longitude.
///
/// At the poles `cos(lat0)` vanishes and the longitude is undefined.
pub fn to_geo(origin: &Origin, planar: PlanarPoint) -> GeoPoint {
    let lat = origin.lat() - (planar.z / EARTH_RADIUS) * 180. / PI;
    let cos_lat = (origin.lat() * PI / 180.).cos();
    let lon = origin.lon() + (planar.x / (EARTH_RADIUS * cos_lat)) * 180. / PI;
    GeoPoint { lat, lon }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_zero() {
        let origin = Origin::new(48.8566, 2.3522);
        let p = origin.to_planar(origin.geo());
        assert_eq!(p, PlanarPoint::new(0., 0.));
    }

    #[test]
    fn test_axes() {
        let origin = Origin::new(0., 0.);
        // North of the origin has negative z
        let north = to_planar(&origin, GeoPoint::new(0.001, 0.));
        assert!(north.z < 0.);
        assert_relative_eq!(north.x, 0.);
        assert_relative_eq!(north.z, -0.001_f64.to_radians() * EARTH_RADIUS, max_relative = 1e-12);
        // East of the origin has positive x
        let east = to_planar(&origin, GeoPoint::new(0., 0.001));
        assert!(east.x > 0.);
        assert_relative_eq!(east.z, 0.);
    }

    #[test]
    fn test_longitude_shrinks_with_latitude() {
        let equator = Origin::new(0., 10.);
        let oslo = Origin::new(60., 10.);
        let at_eq = to_planar(&equator, GeoPoint::new(0., 10.01));
        let at_60 = to_planar(&oslo, GeoPoint::new(60., 10.01));
        assert_relative_eq!(at_60.x, at_eq.x * 0.5, max_relative = 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let origin = Origin::new(52.3702, 4.8952);
        for (dlat, dlon) in [(0.0, 0.0), (0.01, -0.02), (-0.015, 0.005), (0.003, 0.03)] {
            let p = GeoPoint::new(origin.lat() + dlat, origin.lon() + dlon);
            let back = origin.to_geo(origin.to_planar(p));
            assert_relative_eq!(back.lat, p.lat, epsilon = 1e-10);
            assert_relative_eq!(back.lon, p.lon, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_haversine_distance() {
        let a = GeoPoint::new(0., 0.);
        let b = GeoPoint::new(0., 1.);
        assert_relative_eq!(
            a.distance_m(&b),
            EARTH_RADIUS * 1_f64.to_radians(),
            max_relative = 1e-9
        );
        assert_relative_eq!(a.distance_m(&a), 0.);
    }

    #[test]
    fn test_planar_matches_haversine_at_short_range() {
        let origin = Origin::new(45.0, 7.0);
        let p = GeoPoint::new(45.003, 7.004);
        let planar = origin.to_planar(p);
        let flat = planar.distance(&PlanarPoint::new(0., 0.));
        assert_relative_eq!(flat, origin.geo().distance_m(&p), max_relative = 1e-3);
    }
}
