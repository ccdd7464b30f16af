pub mod polygon_3d;
pub mod vector_3d;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// The global "up" axis used when no surface normal is available.
#[must_use]
pub fn z_up() -> Vector3 {
    Vector3::z()
}
