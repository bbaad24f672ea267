//! Scene model: the objects of a render and the materials they use.

use tracer_math::{Interval, Ray};

use crate::error::{RenderError, Result};
use crate::object::{HitResult, MaterialId, Object, ObjectId};
use crate::Material;

/// Closest distance at which an intersection counts.
///
/// Keeps scattered rays from hitting the surface they leave.
pub const T_MIN: f32 = 1e-3;

/// Owns every object and material of a render.
///
/// Objects refer to materials by [`MaterialId`]; ids are only handed out by
/// [`Scene::add_material`] and checked by [`Scene::add_object`], so an object
/// can never outlive or dangle from its material.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Box<dyn Object>>,
    materials: Vec<Material>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a material and returns the id objects use to reference it.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Insert an object in the scene.
    pub fn add_object<O: Object + 'static>(&mut self, object: O) -> Result<ObjectId> {
        let material = object.material();
        if self.materials.get(material.0).is_none() {
            return Err(RenderError::UnknownMaterial(material));
        }
        self.objects.push(Box::new(object));
        Ok(ObjectId(self.objects.len() - 1))
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn object(&self, id: ObjectId) -> Option<&dyn Object> {
        self.objects.get(id.0).map(|o| o.as_ref())
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Find the nearest object hit by `ray`.
    ///
    /// Scans every object once, each bounded by the closest distance found
    /// so far. A candidate replaces the current best only if it is strictly
    /// closer, so of two hits at exactly the same distance the first
    /// inserted object wins.
    pub fn raycast(&self, ray: &Ray) -> Option<HitResult<'_>> {
        let mut closest: Option<(ObjectId, crate::object::SurfaceHit)> = None;
        let mut search = Interval::new(T_MIN, f32::INFINITY);

        for (index, object) in self.objects.iter().enumerate() {
            let Some(hit) = object.intersect(ray, search) else {
                continue;
            };
            let is_closer = closest.map_or(true, |(_, best)| hit.t < best.t);
            if is_closer {
                search = search.with_max(hit.t);
                closest = Some((ObjectId(index), hit));
            }
        }

        let (id, hit) = closest?;
        // Every object passed the material check on insertion
        let material = self.material(self.objects[id.0].material())?;
        Some(HitResult {
            t: hit.t,
            point: hit.point,
            normal: hit.normal,
            object: id,
            material,
        })
    }
}
