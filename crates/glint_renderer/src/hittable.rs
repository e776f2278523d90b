//! Ray-object intersection protocol.

use crate::material::Material;
use glint_math::{Interval, Point3, Ray, Vec3};
use std::sync::Arc;

/// Record of the closest intersection found along a ray.
///
/// Borrows the material of the surface it describes, so it only lives for the
/// duration of one `hit` lookup.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Point3,
    /// Surface normal at the intersection, always facing against the ray
    pub normal: Vec3,
    /// Material of the surface that was hit
    pub material: &'a dyn Material,
    /// Ray parameter at the intersection
    pub t: f32,
    /// True when the ray struck the geometric outside of the surface
    pub front_face: bool,
}

impl<'a> HitRecord<'a> {
    /// Build a record from the geometry-side (outward) normal.
    ///
    /// The stored normal is flipped to face against the incoming ray;
    /// `front_face` remembers which side was struck.
    pub fn new(
        ray: &Ray,
        t: f32,
        p: Point3,
        outward_normal: Vec3,
        material: &'a dyn Material,
    ) -> Self {
        let front_face = ray.direction.dot(outward_normal) < 0.0;
        let normal = if front_face {
            outward_normal
        } else {
            -outward_normal
        };

        Self {
            p,
            normal,
            material,
            t,
            front_face,
        }
    }
}

/// Anything a ray can intersect.
///
/// Implementations are read concurrently by render workers, hence the
/// `Send + Sync` bound.
pub trait Hittable: Send + Sync {
    /// Closest intersection with `ray` whose parameter lies strictly inside
    /// `ray_t`, or `None`.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>>;
}

/// A scene: the aggregate of every object in it.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Arc<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Arc<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Remove all objects.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the scene holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord> = None;
        let mut closest_so_far = ray_t.max;

        for object in &self.objects {
            if let Some(rec) = object.hit(ray, Interval::new(ray_t.min, closest_so_far)) {
                closest_so_far = rec.t;
                closest = Some(rec);
            }
        }

        closest
    }
}
