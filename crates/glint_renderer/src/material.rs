//! Surface scattering models.

use crate::hittable::HitRecord;
use glint_math::sampling::{gen_f32, near_zero, random_unit_vector};
use glint_math::{Color, Ray, Vec3};
use rand::RngCore;

/// Outcome of a scatter event: the surviving ray and its color filter.
pub struct ScatterResult {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How a surface responds to an incoming ray.
pub trait Material: Send + Sync {
    /// Scatter `ray_in` at the intersection described by `rec`.
    ///
    /// Returns `None` when the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult>;
}

/// Diffuse surface scattering with cosine-weighted bounce directions.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        _ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // A sample that lands opposite the normal would cancel to a zero
        // direction; fall back to the normal itself.
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Reflective surface with optional fuzz.
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// `fuzz` is the roughness: 0 is a perfect mirror, 1 fully fuzzed.
    /// Values outside [0, 1] are clamped.
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let reflected =
            reflect(ray_in.direction, rec.normal).normalize() + self.fuzz * random_unit_vector(rng);

        // Fuzzing can push the sample below the surface; treat that as
        // absorption.
        if reflected.dot(rec.normal) <= 0.0 {
            return None;
        }

        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, reflected),
        })
    }
}

/// Clear refractive surface such as glass or water.
pub struct Dielectric {
    /// Refractive index of the material over the index of the surrounding
    /// medium.
    refraction_index: f32,
}

impl Dielectric {
    pub fn new(refraction_index: f32) -> Self {
        Self { refraction_index }
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f32, refraction_index: f32) -> f32 {
        let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        let ri = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray_in.direction.normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Snell's law has no solution past the critical angle: total internal
        // reflection.
        let cannot_refract = ri * sin_theta > 1.0;

        let direction = if cannot_refract || Self::reflectance(cos_theta, ri) > gen_f32(rng) {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, ri)
        };

        Some(ScatterResult {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Reflect `v` about the normal `n`.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through a surface with normal `n`.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::Point3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record_at<'a>(
        ray: &Ray,
        normal: Vec3,
        front_face: bool,
        material: &'a dyn Material,
    ) -> HitRecord<'a> {
        HitRecord {
            p: Point3::ZERO,
            normal,
            material,
            t: 1.0,
            front_face,
        }
    }

    #[test]
    fn test_lambertian_scatters_into_normal_hemisphere() {
        let material = Lambertian::new(Color::new(0.8, 0.2, 0.1));
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        let rec = record_at(&ray, Vec3::Y, true, &material);

        for _ in 0..100 {
            let result = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(result.attenuation, Color::new(0.8, 0.2, 0.1));
            assert_eq!(result.scattered.origin, rec.p);
            assert!(result.scattered.direction.dot(rec.normal) >= 0.0);
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let material = Metal::new(Color::splat(0.9), 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        // 45 degree incidence onto a +Y surface.
        let ray = Ray::new(Point3::ZERO, Vec3::new(1.0, -1.0, 0.0));
        let rec = record_at(&ray, Vec3::Y, true, &material);

        let result = material.scatter(&ray, &rec, &mut rng).unwrap();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((result.scattered.direction - expected).length() < 1e-5);
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        let material = Metal::new(Color::ONE, 7.5);
        assert_eq!(material.fuzz, 1.0);

        let material = Metal::new(Color::ONE, -0.5);
        assert_eq!(material.fuzz, 0.0);
    }

    #[test]
    fn test_fuzzy_metal_absorbs_below_surface_samples() {
        let material = Metal::new(Color::ONE, 1.0);
        let mut rng = StdRng::seed_from_u64(42);

        // Grazing incidence: the fuzz sphere dips below the surface often.
        let ray = Ray::new(Point3::ZERO, Vec3::new(1.0, -1e-4, 0.0));
        let rec = record_at(&ray, Vec3::Y, true, &material);

        let mut absorbed = 0;
        for _ in 0..200 {
            if material.scatter(&ray, &rec, &mut rng).is_none() {
                absorbed += 1;
            }
        }
        assert!(absorbed > 0);
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        let material = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(42);

        // Inside the glass at 60 degrees from the surface normal, past the
        // critical angle (41.8 degrees for n = 1.5).
        let dir = Vec3::new(0.866, 0.5, 0.0).normalize();
        let ray = Ray::new(Point3::ZERO, dir);
        let rec = record_at(&ray, Vec3::new(0.0, -1.0, 0.0), false, &material);

        for _ in 0..20 {
            let result = material.scatter(&ray, &rec, &mut rng).unwrap();
            assert_eq!(result.attenuation, Color::ONE);
            // Reflected back down, never refracted through.
            assert!(result.scattered.direction.y < 0.0);
        }
    }

    #[test]
    fn test_dielectric_mostly_refracts_at_normal_incidence() {
        let material = Dielectric::new(1.5);
        let mut rng = StdRng::seed_from_u64(42);

        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        let rec = record_at(&ray, Vec3::Y, true, &material);

        // Schlick reflectance at normal incidence is about 4 percent.
        let mut refracted = 0;
        for _ in 0..200 {
            let result = material.scatter(&ray, &rec, &mut rng).unwrap();
            if result.scattered.direction.y < 0.0 {
                refracted += 1;
            }
        }
        assert!(refracted > 150);
    }

    #[test]
    fn test_refract_bends_toward_surface() {
        // Air to glass at 45 degrees: the transmitted ray bends toward the
        // normal (Snell's law, sin_t = sin_i / 1.5).
        let uv = Vec3::new(1.0, -1.0, 0.0).normalize();
        let refracted = refract(uv, Vec3::Y, 1.0 / 1.5);

        let sin_incident = uv.x;
        let sin_transmitted = refracted.normalize().x;
        assert!((sin_transmitted - sin_incident / 1.5).abs() < 1e-4);
        assert!(refracted.y < 0.0);
    }

    #[test]
    fn test_reflect_preserves_tangential_component() {
        let v = Vec3::new(3.0, -2.0, 0.0);
        let reflected = reflect(v, Vec3::Y);
        assert_eq!(reflected, Vec3::new(3.0, 2.0, 0.0));
    }
}
