use crate::geom::EPS;
use crate::geom::point::Point;
use crate::geom::ray::Ray;

/// Returns the min and max corners of the box holding all points `pts`.
///
/// An empty slice yields an inverted box (`+inf` min, `-inf` max) that no ray hits.
pub fn bounding_box(pts: &[Point]) -> (Point, Point) {
    let mut pmin = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut pmax = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pts {
        pmin.x = pmin.x.min(p.x);
        pmin.y = pmin.y.min(p.y);
        pmin.z = pmin.z.min(p.z);
        pmax.x = pmax.x.max(p.x);
        pmax.y = pmax.y.max(p.y);
        pmax.z = pmax.z.max(p.z);
    }
    (pmin, pmax)
}


/// Slab test: does the ray segment `[0, max_t]` touch the box `(pmin, pmax)`?
pub fn ray_hits_bbox(ray: &Ray, max_t: f64, pmin: Point, pmax: Point) -> bool {
    let mut t_enter: f64 = 0.;
    let mut t_exit: f64 = max_t;

    let axes = [
        (ray.origin.x, ray.direction.dx, pmin.x, pmax.x),
        (ray.origin.y, ray.direction.dy, pmin.y, pmax.y),
        (ray.origin.z, ray.direction.dz, pmin.z, pmax.z),
    ];

    for (o, d, lo, hi) in axes {
        if d.abs() < EPS {
            // Parallel to the slab
            if o < lo - EPS || o > hi + EPS {
                return false;
            }
            continue;
        }
        let t0 = (lo - o) / d;
        let t1 = (hi - o) / d;
        let (t_near, t_far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        t_enter = t_enter.max(t_near);
        t_exit = t_exit.min(t_far);
        if t_enter > t_exit + EPS {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;

    #[test]
    fn test_bounding_box() {
        let pts = vec![
            Point::new(0., 0., 0.),
            Point::new(2., 5., -1.),
            Point::new(-3., 1., 4.),
        ];
        let (pmin, pmax) = bounding_box(&pts);
        assert!(pmin.is_close(&Point::new(-3., 0., -1.)));
        assert!(pmax.is_close(&Point::new(2., 5., 4.)));
    }

    #[test]
    fn test_ray_hits_bbox() {
        let pmin = Point::new(-1., 0., -11.);
        let pmax = Point::new(1., 10., -9.);
        let north = Ray::new(Point::new(0., 1., 0.), Vector::new(0., 0., -1.)).unwrap();
        let south = Ray::new(Point::new(0., 1., 0.), Vector::new(0., 0., 1.)).unwrap();
        assert!(ray_hits_bbox(&north, 100., pmin, pmax));
        assert!(!ray_hits_bbox(&south, 100., pmin, pmax));
        // Box is beyond the segment end
        assert!(!ray_hits_bbox(&north, 5., pmin, pmax));
    }

    #[test]
    fn test_ray_parallel_outside_bbox() {
        let pmin = Point::new(-1., 0., -11.);
        let pmax = Point::new(1., 10., -9.);
        let ray = Ray::new(Point::new(5., 1., 0.), Vector::new(0., 0., -1.)).unwrap();
        assert!(!ray_hits_bbox(&ray, 100., pmin, pmax));
    }

    #[test]
    fn test_empty_bbox_is_never_hit() {
        let (pmin, pmax) = bounding_box(&[]);
        let ray = Ray::new(Point::new(0., 0., 0.), Vector::new(1., 1., 1.)).unwrap();
        assert!(!ray_hits_bbox(&ray, 1e6, pmin, pmax));
    }
}
