//! Venues and their sun state.

use crate::geo::{GeoPoint, Origin, PlanarPoint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Identifier of a venue, unique within a registry (e.g. `node/123456`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueId(String);

impl VenueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VenueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for VenueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sun state of a venue with the predicted next transition.
///
/// `Unknown` means nothing has been computed yet, which is not the same as shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SunState {
    #[default]
    Unknown,
    Sunny {
        shades_at: Option<DateTime<Utc>>,
    },
    Shaded {
        sunny_at: Option<DateTime<Utc>>,
    },
}

impl SunState {
    pub fn is_sunny(&self) -> bool {
        matches!(self, Self::Sunny { .. })
    }

    pub fn is_shaded(&self) -> bool {
        matches!(self, Self::Shaded { .. })
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Predicted instant of the next flip, if any.
    pub fn transition(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Unknown => None,
            Self::Sunny { shades_at } => *shades_at,
            Self::Shaded { sunny_at } => *sunny_at,
        }
    }

    /// Sunny first, then shaded, then unknown.
    fn rank(&self) -> u8 {
        match self {
            Self::Sunny { .. } => 0,
            Self::Shaded { .. } => 1,
            Self::Unknown => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: VenueId,
    pub name: Option<String>,
    pub position: GeoPoint,
    /// Position in the frame of the registry's current origin.
    pub planar: PlanarPoint,
    /// Source metadata, opaque to the computation.
    pub tags: HashMap<String, String>,
    pub state: SunState,
}

impl Venue {
    /// Creates a venue. Its planar position is set when it joins a registry.
    pub fn new(id: impl Into<VenueId>, position: GeoPoint) -> Self {
        Self {
            id: id.into(),
            name: None,
            position,
            planar: PlanarPoint::new(0., 0.),
            tags: HashMap::new(),
            state: SunState::Unknown,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tags(mut self, tags: HashMap<String, String>) -> Self {
        self.tags = tags;
        self
    }

    /// Street address from the `addr:*` tags, e.g. `12 Carrer de Pelai Barcelona`.
    pub fn address(&self) -> Option<String> {
        let parts: Vec<&str> = ["addr:housenumber", "addr:street", "addr:city"]
            .iter()
            .filter_map(|k| self.tags.get(*k).map(String::as_str))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Holds the venues of the current area.
#[derive(Debug, Clone, Default)]
pub struct VenueRegistry {
    venues: Vec<Venue>,
    index: HashMap<VenueId, usize>,
}

impl VenueRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all venues, projecting them around `origin`.
    ///
    /// All states start as [`SunState::Unknown`]. For repeated ids the first venue wins.
    pub fn replace_all(&mut self, venues: Vec<Venue>, origin: &Origin) {
        self.venues.clear();
        self.index.clear();
        for mut venue in venues {
            if self.index.contains_key(&venue.id) {
                warn!("Duplicate venue id {}, ignoring", venue.id);
                continue;
            }
            venue.planar = origin.to_planar(venue.position);
            venue.state = SunState::Unknown;
            self.index.insert(venue.id.clone(), self.venues.len());
            self.venues.push(venue);
        }
    }

    /// Recomputes planar positions for a new origin and resets all states.
    pub fn reproject(&mut self, origin: &Origin) {
        for venue in self.venues.iter_mut() {
            venue.planar = origin.to_planar(venue.position);
            venue.state = SunState::Unknown;
        }
    }

    pub fn get(&self, id: &VenueId) -> Option<&Venue> {
        self.index.get(id).map(|&i| &self.venues[i])
    }

    pub fn get_mut(&mut self, id: &VenueId) -> Option<&mut Venue> {
        self.index.get(id).map(|&i| &mut self.venues[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Venue> {
        self.venues.iter()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    /// Returns false if no venue has this id.
    pub fn set_sun_state(&mut self, id: &VenueId, state: SunState) -> bool {
        match self.get_mut(id) {
            Some(venue) => {
                venue.state = state;
                true
            }
            None => false,
        }
    }

    pub fn reset_states(&mut self) {
        for venue in self.venues.iter_mut() {
            venue.state = SunState::Unknown;
        }
    }

    /// Ids with planar positions, the input of a batch sun check.
    pub fn positions(&self) -> Vec<(VenueId, PlanarPoint)> {
        self.venues.iter().map(|v| (v.id.clone(), v.planar)).collect()
    }

    pub fn sunny(&self) -> Vec<&Venue> {
        self.venues.iter().filter(|v| v.state.is_sunny()).collect()
    }

    pub fn shaded(&self) -> Vec<&Venue> {
        self.venues.iter().filter(|v| v.state.is_shaded()).collect()
    }

    /// Sunny venues first, then shaded, then unknown; nearest to `user` first within each group.
    pub fn sorted_by(&self, user: GeoPoint) -> Vec<&Venue> {
        let mut out: Vec<(f64, &Venue)> = self
            .venues
            .iter()
            .map(|v| (user.distance_m(&v.position), v))
            .collect();
        out.sort_by(|(da, a), (db, b)| {
            a.state
                .rank()
                .cmp(&b.state.rank())
                .then_with(|| da.partial_cmp(db).unwrap_or(Ordering::Equal))
        });
        out.into_iter().map(|(_, v)| v).collect()
    }
}
