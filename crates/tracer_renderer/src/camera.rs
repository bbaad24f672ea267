//! Camera state for ray generation.

use rand::RngCore;
use tracer_math::{Mat4, Mat4Ext, Ray, Vec3};

use crate::error::{RenderError, Result};
use crate::sampling::gen_f32;

/// Camera transform and the frustum basis derived from it.
///
/// The view matrix maps camera space to world space; the camera looks down
/// its local -Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view: Mat4,
    frustum: Mat4,
}

impl Camera {
    /// Create a camera from a view matrix.
    ///
    /// Fails for matrices without an inverse, whose frustum basis would
    /// turn every ray direction into NaN.
    pub fn from_view(view: Mat4) -> Result<Self> {
        if !view.is_invertible() {
            return Err(RenderError::SingularViewMatrix);
        }
        Ok(Self {
            view,
            frustum: view.frustum_basis(),
        })
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    /// Transpose of the inverse view, for transforming directions.
    pub fn frustum(&self) -> Mat4 {
        self.frustum
    }

    /// Eye position in world space.
    pub fn position(&self) -> Vec3 {
        self.view.eye_position()
    }

    /// Generate a ray for pixel (x, y) with a random sub-pixel offset.
    ///
    /// The jittered pixel position is mapped to [-1, 1] on both axes, with
    /// row 0 at the bottom (v = -1). No aspect correction is applied.
    pub fn get_ray(&self, x: u32, y: u32, width: u32, height: u32, rng: &mut dyn RngCore) -> Ray {
        let u = ((x as f32 + gen_f32(rng)) / width as f32) * 2.0 - 1.0;
        let v = ((y as f32 + gen_f32(rng)) / height as f32) * 2.0 - 1.0;

        let direction = self.frustum.transform_vector3(Vec3::new(u, v, -1.0));
        Ray::new(self.position(), direction)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            frustum: Mat4::IDENTITY,
        }
    }
}
