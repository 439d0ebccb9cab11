//! Ray casting infrastructure.
//!
//! This module provides a Ray struct and ray-geometry intersection tests
//! used for the sun occlusion queries.

use crate::geom::polygon::Face;
use crate::{Point, Vector};

/// Parallel-ray threshold for the triangle test.
const PARALLEL_EPS: f64 = 1e-12;

/// Minimal hit distance, avoids self-intersection at the ray origin.
const MIN_T: f64 = 1e-9;

/// A ray defined by an origin point and a direction vector.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Point,
    /// Unit direction vector
    pub direction: Vector,
}

impl Ray {
    /// Creates a new ray from origin point and direction vector.
    ///
    /// The direction vector is automatically normalized.
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        let normalized = direction.normalize()?;
        Some(Self {
            origin,
            direction: normalized,
        })
    }

    /// Möller–Trumbore intersection with the triangle `(p0, p1, p2)`.
    ///
    /// Both triangle sides are hit. Returns the distance `t > 0` to the hit point.
    pub fn intersect_triangle(&self, p0: Point, p1: Point, p2: Point) -> Option<f64> {
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let pvec = self.direction.cross(&e2);
        let det = e1.dot(&pvec);
        if det.abs() < PARALLEL_EPS {
            return None; // Ray parallel to triangle plane
        }
        let inv_det = 1. / det;

        let tvec = self.origin - p0;
        let u = tvec.dot(&pvec) * inv_det;
        if !(0. ..=1.).contains(&u) {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let v = self.direction.dot(&qvec) * inv_det;
        if v < 0. || u + v > 1. {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if t > MIN_T { Some(t) } else { None }
    }

    /// Returns true if the ray hits the face no farther than `max_t`.
    pub fn hits_face_within(&self, face: &Face, max_t: f64) -> bool {
        face.triangle_points()
            .any(|(a, b, c)| self.intersect_triangle(a, b, c).is_some_and(|t| t <= max_t))
    }
}
