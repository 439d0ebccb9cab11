//! Building footprints and heights as delivered by the geodata layer.

use crate::geo::{GeoPoint, Origin, PlanarPoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Height used when the source carries neither `height` nor `building:levels`.
pub const DEFAULT_BUILDING_HEIGHT: f64 = 10.0;

/// Height of one storey when only `building:levels` is known.
pub const LEVEL_HEIGHT: f64 = 3.0;

/// Ordered ground outline of a building in the planar frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Footprint(Vec<PlanarPoint>);

impl Footprint {
    pub fn new(pts: Vec<PlanarPoint>) -> Self {
        Self(pts)
    }

    /// Projects a geodetic outline around `origin`.
    pub fn from_geo(origin: &Origin, outline: &[GeoPoint]) -> Self {
        Self(outline.iter().map(|g| origin.to_planar(*g)).collect())
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shoelace area on a north-up map. Positive for counter-clockwise outlines.
    pub fn signed_area(&self) -> f64 {
        let n = self.0.len();
        if n < 3 {
            return 0.;
        }
        // With z pointing south, (x, -z) are map coordinates
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.0[i];
                let b = self.0[(i + 1) % n];
                a.x * (-b.z) - b.x * (-a.z)
            })
            .sum();
        0.5 * twice
    }
}

/// A building ready for occlusion: planar footprint plus height in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Building {
    pub footprint: Footprint,
    pub height: f64,
}

impl Building {
    pub fn new(footprint: Footprint, height: f64) -> Self {
        Self { footprint, height }
    }

    /// Builds from a geodetic outline.
    ///
    /// Outlines with 2 points or fewer are not buildings and yield `None`.
    pub fn from_geo(origin: &Origin, outline: &[GeoPoint], height: f64) -> Option<Self> {
        if outline.len() <= 2 {
            return None;
        }
        Some(Self::new(Footprint::from_geo(origin, outline), height))
    }
}

/// A building outline in geodetic coordinates, before projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBuilding {
    pub outline: Vec<GeoPoint>,
    pub height: f64,
}

impl GeoBuilding {
    pub fn new(outline: Vec<GeoPoint>, height: f64) -> Self {
        Self { outline, height }
    }

    pub fn project(&self, origin: &Origin) -> Option<Building> {
        Building::from_geo(origin, &self.outline, self.height)
    }
}

/// Derives a building height from map tags.
///
/// `height` wins (meters, an optional trailing `m` is accepted), then
/// `building:levels` times [`LEVEL_HEIGHT`], then [`DEFAULT_BUILDING_HEIGHT`].
/// Values that do not parse to a positive finite number fall through to the next rule.
pub fn height_from_tags(tags: &HashMap<String, String>) -> f64 {
    height_from_tags_or(tags, DEFAULT_BUILDING_HEIGHT)
}

/// Same as [`height_from_tags`] with a custom fallback height.
pub fn height_from_tags_or(tags: &HashMap<String, String>, default_height: f64) -> f64 {
    if let Some(h) = tags.get("height").and_then(|s| parse_meters(s)) {
        return h;
    }
    if let Some(levels) = tags.get("building:levels").and_then(|s| parse_meters(s)) {
        return levels * LEVEL_HEIGHT;
    }
    default_height
}

fn parse_meters(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('m').unwrap_or(trimmed).trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_height_tag() {
        assert_eq!(height_from_tags(&tags(&[("height", "21.5")])), 21.5);
        assert_eq!(height_from_tags(&tags(&[("height", "12 m")])), 12.);
        assert_eq!(
            height_from_tags(&tags(&[("height", "8"), ("building:levels", "10")])),
            8.
        );
    }

    #[test]
    fn test_levels_tag() {
        assert_eq!(height_from_tags(&tags(&[("building:levels", "4")])), 12.);
        assert_eq!(height_from_tags_or(&tags(&[("building", "yes")]), 7.5), 7.5);
    }

    #[test]
    fn test_default_height() {
        assert_eq!(height_from_tags(&tags(&[])), DEFAULT_BUILDING_HEIGHT);
        assert_eq!(
            height_from_tags(&tags(&[("height", "tall")])),
            DEFAULT_BUILDING_HEIGHT
        );
        assert_eq!(
            height_from_tags(&tags(&[("height", "0"), ("building:levels", "-2")])),
            DEFAULT_BUILDING_HEIGHT
        );
    }

    #[test]
    fn test_signed_area() {
        // Counter-clockwise on the map: east, then north
        let ccw = Footprint::new(vec![
            PlanarPoint::new(0., 0.),
            PlanarPoint::new(2., 0.),
            PlanarPoint::new(2., -2.),
            PlanarPoint::new(0., -2.),
        ]);
        assert_eq!(ccw.signed_area(), 4.);
        let cw = Footprint::new(ccw.points().iter().rev().copied().collect());
        assert_eq!(cw.signed_area(), -4.);
    }

    #[test]
    fn test_from_geo_drops_short_outlines() {
        let origin = Origin::new(50., 8.);
        let two = [GeoPoint::new(50., 8.), GeoPoint::new(50.001, 8.)];
        assert!(Building::from_geo(&origin, &two, 10.).is_none());
        let three = [
            GeoPoint::new(50., 8.),
            GeoPoint::new(50.001, 8.),
            GeoPoint::new(50.001, 8.001),
        ];
        let b = Building::from_geo(&origin, &three, 10.).unwrap();
        assert_eq!(b.footprint.len(), 3);
    }
}
