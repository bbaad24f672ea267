// Camera transform utilities for Mat4
//
// Extends glam::Mat4 with what the path tracer needs to turn a camera
// matrix into world-space rays. glam::Mat4 already provides
// transform_point3(), transform_vector3() (w = 0), inverse() and transpose().

use glam::{Mat4, Vec3};

/// Extension trait for Mat4 to provide camera transform utilities
pub trait Mat4Ext {
    /// The frustum basis: transpose of the inverse.
    ///
    /// Transforms direction vectors (not points) from camera space to world space.
    fn frustum_basis(&self) -> Mat4;

    /// Translation part of the matrix, i.e. the eye position of a camera transform.
    fn eye_position(&self) -> Vec3;

    /// Returns true if the matrix has a finite, non-zero determinant.
    fn is_invertible(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn frustum_basis(&self) -> Mat4 {
        self.inverse().transpose()
    }

    fn eye_position(&self) -> Vec3 {
        self.w_axis.truncate()
    }

    fn is_invertible(&self) -> bool {
        let det = self.determinant();
        det.is_finite() && det.abs() > f32::EPSILON
    }
}
