//! Camera: ray generation and between-pass repositioning.

use glint_math::sampling::{gen_f32, random_in_unit_disk};
use glint_math::{Point3, Quat, Ray, Vec3};
use rand::RngCore;

/// A positionable pinhole camera with an optional thin-lens defocus disk.
///
/// The public fields are the configuration; everything derived from them is
/// cached by [`Camera::initialize`], which a render pass calls once before
/// generating rays. Reconfigure or reposition freely between passes; the next
/// pass picks the changes up.
#[derive(Clone)]
pub struct Camera {
    // Image settings
    pub aspect_ratio: f32,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    // View settings
    pub vfov: f32,
    pub lookfrom: Point3,
    pub lookat: Point3,
    pub vup: Vec3,

    // Lens settings
    pub defocus_angle: f32,
    pub focus_dist: f32,

    // Cached values, recomputed by initialize()
    image_height: u32,
    pixel_samples_scale: f32,
    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Create a camera with default settings.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            vfov: 90.0,
            lookfrom: Point3::new(0.0, 0.0, -1.0),
            lookat: Point3::new(0.0, 0.0, 1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            image_height: 100,
            pixel_samples_scale: 0.1,
            center: Point3::ZERO,
            pixel00_loc: Point3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
        }
    }

    /// Set output size as aspect ratio plus width in pixels.
    pub fn with_image(mut self, aspect_ratio: f32, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set sampling quality.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set the view transform.
    pub fn with_view(mut self, lookfrom: Point3, lookat: Point3, vup: Vec3) -> Self {
        self.lookfrom = lookfrom;
        self.lookat = lookat;
        self.vup = vup;
        self
    }

    /// Set field of view and lens behavior.
    pub fn with_lens(mut self, vfov: f32, defocus_angle: f32, focus_dist: f32) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Derive the cached state from the current configuration.
    ///
    /// Degenerate settings are clamped into the valid range first: at least
    /// one pixel each way, at least one sample, at least one bounce.
    pub fn initialize(&mut self) {
        self.image_width = self.image_width.max(1);
        self.samples_per_pixel = self.samples_per_pixel.max(1);
        self.max_depth = self.max_depth.max(1);

        self.image_height = ((self.image_width as f32 / self.aspect_ratio) as u32).max(1);
        self.pixel_samples_scale = 1.0 / self.samples_per_pixel as f32;
        self.center = self.lookfrom;

        // Viewport dimensions at the focus plane
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width = viewport_height * (self.image_width as f32 / self.image_height as f32);

        // Orthonormal view basis
        self.w = (self.lookfrom - self.lookat).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport edges, left-to-right and top-to-bottom
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        self.pixel_delta_u = viewport_u / self.image_width as f32;
        self.pixel_delta_v = viewport_v / self.image_height as f32;

        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;
    }

    /// Rendered image height in pixels, valid after [`Camera::initialize`].
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Averaging factor `1 / samples_per_pixel`.
    pub fn pixel_samples_scale(&self) -> f32 {
        self.pixel_samples_scale
    }

    /// Generate a ray through pixel `(i, j)`, jittered inside the pixel.
    ///
    /// With a positive `defocus_angle` the origin is sampled on the lens
    /// disk; otherwise it is exactly the camera center.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + ((i as f32) + offset.x) * self.pixel_delta_u
            + ((j as f32) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Move the camera relative to its own orientation.
    ///
    /// `move_by.x` slides along the right vector, `move_by.y` along `vup`,
    /// `move_by.z` along the view direction. The look target moves with the
    /// camera, so the heading is unchanged. Takes effect at the next
    /// `initialize`.
    pub fn translate(&mut self, move_by: Vec3) {
        let direction = (self.lookat - self.lookfrom).normalize();
        let right = direction.cross(self.vup).normalize();

        let offset = right * move_by.x + self.vup * move_by.y + direction * move_by.z;
        self.lookfrom += offset;
        self.lookat += offset;
    }

    /// Turn the camera in place by `delta_yaw` then `delta_pitch` radians.
    ///
    /// Yaw spins about the world up axis. Pitch tilts about the right vector
    /// of the already-yawed heading, so it stays a pure up/down motion at any
    /// heading. Only the look target moves.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let direction = self.lookat - self.lookfrom;

        let yawed = Quat::from_axis_angle(Vec3::Y, delta_yaw) * direction;

        let right = yawed.cross(self.vup).normalize();
        let pitched = Quat::from_axis_angle(right, delta_pitch) * yawed;

        self.lookat = self.lookfrom + pitched;
    }

    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Jitter offset in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}
