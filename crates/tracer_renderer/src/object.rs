//! Object trait and hit records for ray-object intersection.

use serde::{Deserialize, Serialize};
use tracer_math::{Interval, Ray, Vec3};

use crate::Material;

/// Index of a material in the scene's material arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub usize);

/// Index of an object in the scene, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Geometric part of an intersection, as reported by a single object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Outward unit surface normal at the intersection
    pub normal: Vec3,
}

/// The nearest intersection of a ray with the scene.
///
/// Only exists when something was hit.
#[derive(Debug, Clone, Copy)]
pub struct HitResult<'a> {
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Point of intersection
    pub point: Vec3,
    /// Outward unit surface normal at the intersection
    pub normal: Vec3,
    /// The object that was hit
    pub object: ObjectId,
    /// Material of the object that was hit
    pub material: &'a Material,
}

impl<'a> HitResult<'a> {
    /// Color the hit object attenuates a path by.
    #[inline]
    pub fn color(&self) -> Vec3 {
        self.material.color
    }
}

/// Trait for objects that can be hit by rays.
///
/// Objects reference their material by id; the scene owns both.
pub trait Object: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    ///
    /// Returns the nearest such hit.
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<SurfaceHit>;

    /// Material used to shade this object.
    fn material(&self) -> MaterialId;
}
