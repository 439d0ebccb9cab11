//! Overpass API JSON responses.
//!
//! Buildings are ways tagged `building=*`, with their outline given either by
//! node references (`out body; >;`) or inline (`out geom`). Venues are cafes,
//! and restaurants or bars with `outdoor_seating=yes`, as nodes or as ways
//! with a `center` (`out center`).

use crate::building::{GeoBuilding, height_from_tags_or};
use crate::geo::GeoPoint;
use crate::venue::Venue;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Way(Way),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Way {
    pub id: u64,
    #[serde(default)]
    pub nodes: Vec<u64>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    pub center: Option<GeoPoint>,
    pub geometry: Option<Vec<GeoPoint>>,
}

pub fn parse_overpass(json: &str) -> Result<OverpassResponse> {
    serde_json::from_str(json).context("Failed to parse Overpass response")
}

pub fn read_overpass(path: &Path) -> Result<OverpassResponse> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse Overpass response: {}", path.display()))
}

/// Amenities served outdoors.
fn is_terrace_venue(tags: &HashMap<String, String>) -> bool {
    let outdoor = tags.get("outdoor_seating").is_some_and(|v| v == "yes");
    match tags.get("amenity").map(String::as_str) {
        Some("cafe") => true,
        Some("restaurant") | Some("bar") => outdoor,
        _ => false,
    }
}

impl OverpassResponse {
    fn node_index(&self) -> HashMap<u64, GeoPoint> {
        self.elements
            .iter()
            .filter_map(|el| match el {
                Element::Node(n) => Some((n.id, GeoPoint::new(n.lat, n.lon))),
                _ => None,
            })
            .collect()
    }

    /// Building outlines with heights from tags (see [`height_from_tags_or`]).
    ///
    /// Missing node references are skipped; outlines left with 2 points or
    /// fewer are dropped.
    pub fn buildings(&self, default_height: f64) -> Vec<GeoBuilding> {
        let nodes = self.node_index();
        let mut out = Vec::new();
        for el in &self.elements {
            let Element::Way(way) = el else { continue };
            if !way.tags.contains_key("building") {
                continue;
            }
            let outline: Vec<GeoPoint> = match &way.geometry {
                Some(geometry) => geometry.clone(),
                None => way.nodes.iter().filter_map(|id| nodes.get(id).copied()).collect(),
            };
            if outline.len() <= 2 {
                debug!("way {} has no usable outline, skipping", way.id);
                continue;
            }
            let height = height_from_tags_or(&way.tags, default_height);
            out.push(GeoBuilding::new(outline, height));
        }
        out
    }

    /// Venues with outdoor seating, identified as `node/<id>` or `way/<id>`.
    pub fn venues(&self) -> Vec<Venue> {
        let mut out = Vec::new();
        for el in &self.elements {
            let (id, position, tags) = match el {
                Element::Node(n) => (
                    format!("node/{}", n.id),
                    Some(GeoPoint::new(n.lat, n.lon)),
                    &n.tags,
                ),
                Element::Way(w) => (format!("way/{}", w.id), w.center, &w.tags),
                Element::Other => continue,
            };
            if !is_terrace_venue(tags) {
                continue;
            }
            let Some(position) = position else {
                debug!("{id} has no position, skipping");
                continue;
            };
            let mut venue = Venue::new(id, position).with_tags(tags.clone());
            if let Some(name) = tags.get("name") {
                venue = venue.with_name(name.clone());
            }
            out.push(venue);
        }
        out
    }
}
