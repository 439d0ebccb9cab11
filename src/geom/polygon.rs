//! Planar faces of occlusion solids.

use crate::geom::triangles::{TriangleIndex, triangulate};
use crate::{Point, Vector};
use anyhow::{Result, anyhow};

/// A planar polygon with an explicit triangle list.
///
/// The triangles are what rays are tested against; the vertex loop and normal
/// are kept for consumers that want the outline (e.g. exporters).
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub name: String,
    pts: Vec<Point>,
    vn: Vector,
    tri: Vec<TriangleIndex>,
}

impl Face {
    /// Creates a face from its vertex loop.
    ///
    /// The normal is computed with Newell's method, so it follows the winding
    /// of `pts`. When `normal` is given and points the other way, the vertex
    /// order is reversed to match it. A self-intersecting loop whose lobes
    /// cancel has no Newell normal; it then takes the given `normal`.
    pub fn new(name: &str, mut pts: Vec<Point>, normal: Option<Vector>) -> Result<Self> {
        if pts.len() < 3 {
            return Err(anyhow!("Face {name} needs at least 3 vertices, got {}", pts.len()));
        }

        let mut vn = newell_normal(&pts)
            .or_else(|| normal.and_then(|n| n.normalize()))
            .ok_or_else(|| anyhow!("Face {name} has zero area, cannot compute its normal"))?;

        if let Some(expected) = normal
            && expected.dot(&vn) < 0.
        {
            pts.reverse();
            vn = -vn;
        }

        let tri = triangulate(&pts, &vn);
        if tri.is_empty() {
            return Err(anyhow!("Face {name} could not be triangulated"));
        }

        Ok(Self {
            name: name.to_string(),
            pts,
            vn,
            tri,
        })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.pts
    }

    pub fn normal(&self) -> Vector {
        self.vn
    }

    pub fn triangles(&self) -> &[TriangleIndex] {
        &self.tri
    }

    /// Iterates over the corner points of each triangle.
    pub fn triangle_points(&self) -> impl Iterator<Item = (Point, Point, Point)> + '_ {
        self.tri
            .iter()
            .map(|t| (self.pts[t.0], self.pts[t.1], self.pts[t.2]))
    }

    /// Surface area, summed over the triangles.
    pub fn area(&self) -> f64 {
        self.triangle_points()
            .map(|(a, b, c)| 0.5 * (b - a).cross(&(c - a)).length())
            .sum()
    }
}

/// Polygon normal from Newell's method. Robust for non-convex and slightly
/// non-planar vertex loops.
pub fn newell_normal(pts: &[Point]) -> Option<Vector> {
    let mut n = Vector::new(0., 0., 0.);
    for (i, cur) in pts.iter().enumerate() {
        let nxt = pts[(i + 1) % pts.len()];
        n.dx += (cur.y - nxt.y) * (cur.z + nxt.z);
        n.dy += (cur.z - nxt.z) * (cur.x + nxt.x);
        n.dz += (cur.x - nxt.x) * (cur.y + nxt.y);
    }
    n.normalize()
}
