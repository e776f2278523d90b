//! Path-tracing integrator and the parallel render pass.

use crate::bands::{partition_rows, RowBand};
use crate::camera::Camera;
use crate::environment::EnvironmentMap;
use crate::framebuffer::FrameBuffer;
use crate::hittable::Hittable;
use glint_math::{Color, Interval, Ray};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Compute the color seen along a ray.
///
/// Recursively follows scattered rays until the bounce budget runs out, the
/// path is absorbed, or the ray escapes to the background. The minimum hit
/// parameter of 0.001 keeps freshly scattered rays from re-hitting their own
/// surface.
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    environment: Option<&EnvironmentMap>,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // Bounce budget exhausted: no more light is gathered
    if depth == 0 {
        return Color::ZERO;
    }

    if let Some(rec) = world.hit(ray, Interval::new(0.001, f32::INFINITY)) {
        return match rec.material.scatter(ray, &rec, rng) {
            Some(scatter) => {
                scatter.attenuation
                    * ray_color(&scatter.scattered, world, environment, depth - 1, rng)
            }
            None => Color::ZERO,
        };
    }

    match environment {
        Some(env) => env.sample_direction(ray.direction),
        None => sky_gradient(ray),
    }
}

/// Analytic background for rays that leave the scene: white at the horizon
/// blending to light blue straight up.
fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction.normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    (1.0 - a) * Color::ONE + a * Color::new(0.5, 0.7, 1.0)
}

/// Estimate one pixel: the mean of `samples_per_pixel` jittered camera rays.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    environment: Option<&EnvironmentMap>,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, environment, camera.max_depth, rng);
    }

    pixel_color * camera.pixel_samples_scale()
}

/// Render one full pass into `buffer`, blocking until it completes.
///
/// The camera is re-initialized first, so configuration and position changes
/// made since the last pass take effect here. Rows are split into contiguous
/// bands, one per worker; every band writes its own disjoint slice of the
/// buffer and drives its own RNG, so the pass needs no locking.
pub fn render(
    camera: &mut Camera,
    world: &dyn Hittable,
    environment: Option<&EnvironmentMap>,
    buffer: &mut FrameBuffer,
) {
    camera.initialize();
    let cam: &Camera = camera;

    let width = cam.image_width;
    let height = cam.image_height();
    if buffer.width() != width || buffer.height() != height {
        buffer.resize(width, height);
    }

    let bands = partition_rows(height, rayon::current_num_threads() as u32);
    let band_count = bands.len();

    // Carve the pixel buffer into one disjoint slice per band.
    let mut rest = buffer.pixels_mut();
    let mut jobs: Vec<(RowBand, &mut [Color])> = Vec::with_capacity(band_count);
    for band in &bands {
        let taken = std::mem::take(&mut rest);
        let (slice, tail) = taken.split_at_mut((band.row_count() * width) as usize);
        jobs.push((*band, slice));
        rest = tail;
    }

    let started = Instant::now();
    jobs.into_par_iter().for_each(|(band, slice)| {
        let mut rng = SmallRng::from_entropy();

        for (row_offset, row) in slice.chunks_mut(width as usize).enumerate() {
            let y = band.start + row_offset as u32;
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = render_pixel(cam, world, environment, x as u32, y, &mut rng);
            }
        }
    });

    log::debug!(
        "rendered {}x{} at {} spp over {} bands in {:.2?}",
        width,
        height,
        cam.samples_per_pixel,
        band_count,
        started.elapsed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::{HitRecord, HittableList};
    use crate::material::{Lambertian, Material, ScatterResult};
    use glint_math::{Point3, Vec3};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Scatters every ray along the stored normal and counts the calls.
    struct CountingScatter {
        calls: AtomicU32,
    }

    impl CountingScatter {
        fn new() -> Self {
            Self {
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Material for CountingScatter {
        fn scatter(
            &self,
            _ray_in: &Ray,
            rec: &HitRecord,
            _rng: &mut dyn RngCore,
        ) -> Option<ScatterResult> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Some(ScatterResult {
                attenuation: Color::ONE,
                scattered: Ray::new(rec.p, rec.normal),
            })
        }
    }

    /// Absorbs everything.
    struct Absorb;

    impl Material for Absorb {
        fn scatter(
            &self,
            _ray_in: &Ray,
            _rec: &HitRecord,
            _rng: &mut dyn RngCore,
        ) -> Option<ScatterResult> {
            None
        }
    }

    fn sphere_world(material: Arc<dyn Material>) -> HittableList {
        let mut world = HittableList::new();
        world.add(Arc::new(crate::sphere::Sphere::new(
            Point3::new(0.0, 0.0, -2.0),
            0.5,
            material,
        )));
        world
    }

    #[test]
    fn test_depth_zero_is_black() {
        let world = sphere_world(Arc::new(Lambertian::new(Color::splat(0.9))));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let color = ray_color(&ray, &world, None, 0, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_absorbed_path_is_black() {
        let world = sphere_world(Arc::new(Absorb));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let color = ray_color(&ray, &world, None, 10, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_depth_budget_counts_bounces() {
        // Ray starts inside an enclosing sphere whose material always
        // scatters, so the only way out of the recursion is the budget.
        let material = Arc::new(CountingScatter::new());
        let mut world = HittableList::new();
        world.add(Arc::new(crate::sphere::Sphere::new(
            Point3::ZERO,
            1.0,
            material.clone(),
        )));

        let mut rng = StdRng::seed_from_u64(42);
        let ray = Ray::new(Point3::ZERO, Vec3::X);
        let color = ray_color(&ray, &world, None, 7, &mut rng);

        assert_eq!(color, Color::ZERO);
        assert_eq!(material.calls.load(Ordering::Relaxed), 7);
    }

    #[test]
    fn test_sky_gradient_blends_with_height() {
        let up = sky_gradient(&Ray::new(Point3::ZERO, Vec3::Y));
        let down = sky_gradient(&Ray::new(Point3::ZERO, Vec3::new(0.0, -1.0, 0.0)));

        // Overhead is the blue endpoint, straight down the white one.
        assert!((up - Color::new(0.5, 0.7, 1.0)).length() < 1e-5);
        assert!((down - Color::ONE).length() < 1e-5);

        let level = sky_gradient(&Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0)));
        assert!((level - Color::new(0.75, 0.85, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_miss_prefers_environment_over_sky() {
        let world = HittableList::new();
        let env = EnvironmentMap::from_raw_parts(1, 1, 3, vec![255, 0, 0]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::ZERO, Vec3::new(0.3, 0.4, -0.6));
        let with_env = ray_color(&ray, &world, Some(&env), 5, &mut rng);
        assert!(with_env.x > 0.99 && with_env.y == 0.0 && with_env.z == 0.0);

        let without = ray_color(&ray, &world, None, 5, &mut rng);
        assert_ne!(without, with_env);
    }

    #[test]
    fn test_render_pixel_mean_stays_bounded() {
        let world = sphere_world(Arc::new(Lambertian::new(Color::new(0.7, 0.6, 0.5))));
        let mut camera = Camera::new()
            .with_image(1.0, 16)
            .with_view(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_quality(8, 4);
        camera.initialize();

        let mut rng = StdRng::seed_from_u64(42);
        for (x, y) in [(8, 8), (0, 0), (15, 15)] {
            let color = render_pixel(&camera, &world, None, x, y, &mut rng);
            for channel in [color.x, color.y, color.z] {
                assert!((0.0..=1.0).contains(&channel), "channel = {channel}");
            }
        }
    }

    #[test]
    fn test_render_fills_buffer() {
        let world = sphere_world(Arc::new(Lambertian::new(Color::splat(0.5))));
        let mut camera = Camera::new()
            .with_image(2.0, 32)
            .with_view(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_quality(4, 4);

        let mut buffer = FrameBuffer::new(1, 1);
        render(&mut camera, &world, None, &mut buffer);

        assert_eq!(buffer.width(), 32);
        assert_eq!(buffer.height(), 16);

        let mut lit = 0;
        for pixel in buffer.pixels() {
            for channel in [pixel.x, pixel.y, pixel.z] {
                assert!((0.0..=1.0).contains(&channel));
            }
            if pixel.length_squared() > 0.0 {
                lit += 1;
            }
        }
        // Sky pixels alone guarantee plenty of non-black output.
        assert!(lit > 0);
    }
}
