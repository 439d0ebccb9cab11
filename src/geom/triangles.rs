use crate::Point;
use crate::geom::EPS;
use crate::geom::vector::Vector;

/// Type for holding vertex indices for a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleIndex(pub usize, pub usize, pub usize);

/// Triangulates the polygon defined by points `pts` and unit normal `vn`.
///
/// Ear clipping is tried first with the given winding, then with the reversed
/// winding. Footprints coming from map data can self-intersect, in which case
/// neither pass finishes and a fan from the first vertex is returned instead.
/// The result is never empty for 3 or more non-collinear points.
pub fn triangulate(pts: &[Point], vn: &Vector) -> Vec<TriangleIndex> {
    if pts.len() < 3 {
        return Vec::new();
    }

    let forward: Vec<usize> = (0..pts.len()).collect();
    if let Some(tri) = ear_clip(pts, forward.clone(), vn) {
        return tri;
    }

    let reversed: Vec<usize> = forward.iter().rev().copied().collect();
    if let Some(tri) = ear_clip(pts, reversed, vn) {
        return tri;
    }

    tracing::debug!(
        num_pts = pts.len(),
        "ear clipping failed, falling back to fan triangulation"
    );
    fan(pts)
}

fn ear_clip(pts: &[Point], mut vertices: Vec<usize>, vn: &Vector) -> Option<Vec<TriangleIndex>> {
    let mut triangles: Vec<TriangleIndex> = Vec::new();
    let mut pos: usize = 0;
    let mut num_fail: usize = 0;

    while vertices.len() > 3 {
        if num_fail > vertices.len() {
            return None;
        }

        // If last vertex, start from the beginning
        if pos > vertices.len() - 1 {
            pos = 0;
        }

        let prev_pos = if pos > 0 { pos - 1 } else { vertices.len() - 1 };
        let next_pos = if pos < vertices.len() - 1 { pos + 1 } else { 0 };

        let prev_id = vertices[prev_pos];
        let curr_id = vertices[pos];
        let next_id = vertices[next_pos];

        if is_corner_convex(&pts[prev_id], &pts[curr_id], &pts[next_id], vn) {
            // No other vertex may lie within the ear (non-convex polygons)
            let any_point_inside = vertices.iter().any(|&test_id| {
                ![prev_id, curr_id, next_id].contains(&test_id)
                    && is_point_inside_triangle(
                        pts[test_id],
                        pts[prev_id],
                        pts[curr_id],
                        pts[next_id],
                    )
            });
            if !any_point_inside {
                triangles.push(TriangleIndex(prev_id, curr_id, next_id));
                vertices.remove(pos);
                num_fail = 0;
                continue;
            }
        }

        num_fail += 1;
        pos += 1;
    }

    let (a, b, c) = (vertices[0], vertices[1], vertices[2]);
    if Vector::normal(pts[a], pts[b], pts[c]).is_some() {
        triangles.push(TriangleIndex(a, b, c));
    }

    if triangles.is_empty() {
        None
    } else {
        Some(triangles)
    }
}

fn fan(pts: &[Point]) -> Vec<TriangleIndex> {
    (1..pts.len() - 1)
        .filter(|&i| Vector::normal(pts[0], pts[i], pts[i + 1]).is_some())
        .map(|i| TriangleIndex(0, i, i + 1))
        .collect()
}

/// Checks if the angle between p2->p1 and p2->p3 is less than 180 degrees
///
/// It is done by comparing the polygon normal vector with the cross
/// product p1->p2 x p2->p3. The points p1, p2, p3 should be ordered
/// counter-clockwise with respect to the surface front side.
/// Collinear corners are not convex.
pub fn is_corner_convex(p1: &Point, p2: &Point, p3: &Point, vn: &Vector) -> bool {
    let v1: Vector = *p2 - *p1;
    let v2: Vector = *p3 - *p2;
    match v1.cross(&v2).normalize() {
        Some(v1v2_n) => v1v2_n.dot(vn) > 1. - 1e-6,
        None => false,
    }
}

/// Tests if point `ptest` is inside the triangle `(p1, p2, p3)`, edges included.
///
/// Using the "same side technique" described at:
/// https://blackpawn.com/texts/pointinpoly/
/// This function does not test if the point is coplanar with the triangle.
pub fn is_point_inside_triangle(ptest: Point, p1: Point, p2: Point, p3: Point) -> bool {
    let same_side = |a: Point, b: Point, p: Point, q: Point| -> bool {
        let ab = b - a;
        let cp1 = ab.cross(&(p - a));
        let cp2 = ab.cross(&(q - a));
        cp1.dot(&cp2) >= -EPS
    };

    same_side(p1, p2, ptest, p3) && same_side(p2, p3, ptest, p1) && same_side(p3, p1, ptest, p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UP: Vector = Vector {
        dx: 0.,
        dy: 1.,
        dz: 0.,
    };

    /// Ground-plane point from map coordinates (east, north).
    fn en(e: f64, n: f64) -> Point {
        Point::new(e, 0., -n)
    }

    fn total_area(pts: &[Point], tri: &[TriangleIndex]) -> f64 {
        tri.iter()
            .map(|t| 0.5 * (pts[t.1] - pts[t.0]).cross(&(pts[t.2] - pts[t.0])).length())
            .sum()
    }

    #[test]
    fn test_triangulate_square() {
        let pts = vec![en(0., 0.), en(1., 0.), en(1., 1.), en(0., 1.)];
        let tri = triangulate(&pts, &UP);
        assert_eq!(tri.len(), 2);
        assert!((total_area(&pts, &tri) - 1.).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_clockwise_square() {
        let pts = vec![en(0., 0.), en(0., 1.), en(1., 1.), en(1., 0.)];
        let tri = triangulate(&pts, &UP);
        assert_eq!(tri.len(), 2);
        assert!((total_area(&pts, &tri) - 1.).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_l_shape() {
        let mut pts = vec![
            en(0., 0.),
            en(1., 0.),
            en(1., 1.),
            en(2., 1.),
            en(2., 2.),
            en(0., 2.),
        ];
        // Test at different starting points
        for _ in 0..pts.len() {
            pts.rotate_right(1);
            let tri = triangulate(&pts, &UP);
            assert_eq!(tri.len(), 4);
            assert!((total_area(&pts, &tri) - 3.).abs() < 1e-9);
            for t in tri.iter() {
                let tri_vn = Vector::normal(pts[t.0], pts[t.1], pts[t.2]).unwrap();
                assert!(tri_vn.is_close(&UP));
            }
        }
    }

    #[test]
    fn test_triangulate_u_shape() {
        let pts = vec![
            en(0., 0.),
            en(1., 0.),
            en(1., 1.),
            en(2., 1.),
            en(2., 0.),
            en(3., 0.),
            en(3., 2.),
            en(0., 2.),
        ];
        let tri = triangulate(&pts, &UP);
        assert_eq!(tri.len(), 6);
        assert!((total_area(&pts, &tri) - 5.).abs() < 1e-9);
    }

    #[test]
    fn test_self_intersecting_does_not_panic() {
        // Bow-tie
        let pts = vec![en(0., 0.), en(1., 1.), en(1., 0.), en(0., 1.)];
        let tri = triangulate(&pts, &UP);
        assert!(!tri.is_empty());
    }

    #[test]
    fn test_too_few_points() {
        let pts = vec![en(0., 0.), en(1., 1.)];
        assert!(triangulate(&pts, &UP).is_empty());
    }

    #[test]
    fn test_is_point_inside_triangle() {
        let p1 = en(1., 0.);
        let p2 = en(0., 0.);
        let p3 = en(0., 1.);

        assert!(is_point_inside_triangle(en(0.1, 0.1), p1, p2, p3));
        assert!(is_point_inside_triangle(en(0., 0.), p1, p2, p3)); // corner
        assert!(is_point_inside_triangle(en(0.5, 0.5), p1, p2, p3)); // edge
        assert!(!is_point_inside_triangle(en(0.51, 0.51), p1, p2, p3));
    }

    #[test]
    fn test_is_corner_convex() {
        assert!(is_corner_convex(&en(0., 0.), &en(1., 0.), &en(1., 1.), &UP));
        assert!(!is_corner_convex(&en(0., 0.), &en(1., 0.), &en(1., -1.), &UP));
        assert!(!is_corner_convex(&en(0., 0.), &en(1., 0.), &en(2., 0.), &UP));
    }
}
