// Re-export glam for convenience
pub use glam::*;

mod interval;
mod ray;
pub mod sampling;

pub use interval::Interval;
pub use ray::Ray;

/// A position in 3D space. Alias of [`Vec3`], kept for readability at call
/// sites that mean "a point" rather than "an offset".
pub type Point3 = Vec3;

/// An RGB triple with linear-light components. Alias of [`Vec3`].
pub type Color = Vec3;
