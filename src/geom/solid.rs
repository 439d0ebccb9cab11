//! Occlusion solids: building footprints extruded into closed vertical prisms.

use crate::building::Footprint;
use crate::geo::PlanarPoint;
use crate::geom::EPS;
use crate::geom::bboxes::{bounding_box, ray_hits_bbox};
use crate::geom::polygon::Face;
use crate::geom::ray::Ray;
use crate::{Point, Vector};
use anyhow::{Result, anyhow};

/// Vertices closer than this (meters) are merged before extrusion.
const DEDUP_TOLERANCE: f64 = 1e-6;

const UP: Vector = Vector {
    dx: 0.,
    dy: 1.,
    dz: 0.,
};

/// A closed prism used only for ray blocking.
///
/// Faces:
/// - `floor` at `y = 0` (normal down)
/// - `roof` at `y = height` (normal up)
/// - `wall_<i>` for the footprint edge `i -> i+1` (normal outwards)
#[derive(Debug, Clone)]
pub struct OcclusionSolid {
    faces: Vec<Face>,
    height: f64,
    bbox: (Point, Point),
    footprint_area: f64,
}

impl OcclusionSolid {
    /// Sweeps `footprint` from the ground up to `height`.
    ///
    /// Refuses footprints with fewer than 3 distinct points, zero area,
    /// non-finite coordinates, and non-positive heights. Self-intersecting
    /// outlines are extruded as they are, and their area is the triangulated
    /// floor area.
    pub fn from_footprint(footprint: &Footprint, height: f64) -> Result<Self> {
        if !height.is_finite() || height <= 0. {
            return Err(anyhow!("Building height must be positive, got {height}"));
        }
        if footprint.points().iter().any(|p| !p.is_finite()) {
            return Err(anyhow!("Footprint contains non-finite coordinates"));
        }

        let plan = clean_outline(footprint.points());
        if plan.len() < 3 {
            return Err(anyhow!(
                "Footprint needs at least 3 distinct points, got {}",
                plan.len()
            ));
        }
        let cleaned = Footprint::new(plan);
        let plan = cleaned.points();

        let floor_pts: Vec<Point> = plan.iter().map(|p| p.at_height(0.)).collect();
        let roof_pts: Vec<Point> = plan.iter().map(|p| p.at_height(height)).collect();

        // Lobes of a self-intersecting outline cancel in the signed area but
        // not in the triangulated one
        let floor = Face::new("floor", floor_pts.clone(), Some(-UP))?;
        let footprint_area = floor.area();
        if footprint_area < EPS {
            return Err(anyhow!("Footprint has zero area"));
        }

        let mut faces: Vec<Face> = Vec::with_capacity(plan.len() + 2);
        faces.push(floor);
        faces.push(Face::new("roof", roof_pts.clone(), Some(UP))?);

        // Interior is on the left of each edge for counter-clockwise outlines
        let winding = if cleaned.signed_area() < 0. { -1. } else { 1. };
        for i in 0..plan.len() {
            let nxt = (i + 1) % plan.len();
            let edge = floor_pts[nxt] - floor_pts[i];
            let outward = edge.cross(&UP) * winding;
            let quad = vec![floor_pts[i], floor_pts[nxt], roof_pts[nxt], roof_pts[i]];
            match Face::new(&format!("wall_{i}"), quad, Some(outward)) {
                Ok(face) => faces.push(face),
                Err(e) => tracing::debug!("skipping wall {i}: {e}"),
            }
        }

        let corners: Vec<Point> = floor_pts.iter().chain(roof_pts.iter()).copied().collect();
        let bbox = bounding_box(&corners);

        Ok(Self {
            faces,
            height,
            bbox,
            footprint_area,
        })
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Min and max corners of the axis-aligned box around the solid.
    pub fn bbox(&self) -> (Point, Point) {
        self.bbox
    }

    pub fn footprint_area(&self) -> f64 {
        self.footprint_area
    }

    /// Returns true if `ray` hits any face no farther than `max_t`.
    pub fn blocks(&self, ray: &Ray, max_t: f64) -> bool {
        let (pmin, pmax) = self.bbox;
        if !ray_hits_bbox(ray, max_t, pmin, pmax) {
            return false;
        }
        self.faces.iter().any(|f| ray.hits_face_within(f, max_t))
    }
}

/// Drops repeated vertices (including the closing vertex of closed ways)
/// and vertices lying on a straight edge.
fn clean_outline(pts: &[PlanarPoint]) -> Vec<PlanarPoint> {
    let mut out: Vec<PlanarPoint> = Vec::with_capacity(pts.len());
    for p in pts {
        if out.last().is_none_or(|last| last.distance(p) > DEDUP_TOLERANCE) {
            out.push(*p);
        }
    }
    while out.len() > 1
        && out
            .first()
            .zip(out.last())
            .is_some_and(|(first, last)| first.distance(last) <= DEDUP_TOLERANCE)
    {
        out.pop();
    }

    // Remove collinear vertices until none are left
    let mut changed = true;
    while changed && out.len() >= 3 {
        changed = false;
        for i in 0..out.len() {
            let prev = out[(i + out.len() - 1) % out.len()];
            let next = out[(i + 1) % out.len()];
            let cur = out[i];
            let cross = (cur.x - prev.x) * (next.z - cur.z) - (cur.z - prev.z) * (next.x - cur.x);
            let scale = prev.distance(&cur) * cur.distance(&next);
            if cross.abs() <= 1e-9 * scale.max(EPS) {
                out.remove(i);
                changed = true;
                break;
            }
        }
    }

    out
}
