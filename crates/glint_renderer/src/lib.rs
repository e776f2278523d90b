//! glint renderer - CPU path tracing
//!
//! A Monte Carlo path tracer over implicit spheres: scatter-based materials,
//! an equirectangular environment background, a repositionable thin-lens
//! camera, and a render pass parallelized over disjoint row bands.

mod bands;
mod camera;
mod environment;
mod framebuffer;
mod hittable;
mod material;
mod renderer;
mod sphere;

pub use bands::{partition_rows, RowBand};
pub use camera::Camera;
pub use environment::{EnvironmentError, EnvironmentMap};
pub use framebuffer::{linear_to_gamma, FrameBuffer};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use renderer::{ray_color, render, render_pixel};
pub use sphere::Sphere;

/// Re-export the math types that appear throughout the public API.
pub use glint_math::{Color, Interval, Point3, Ray, Vec3};
