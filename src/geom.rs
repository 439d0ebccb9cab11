pub mod bboxes;
pub mod point;
pub mod polygon;
pub mod ray;
pub mod solid;
pub mod triangles;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-9;

/// Approximate equality with the crate-wide geometric precision.
pub trait IsClose {
    fn is_close(&self, other: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }
}
