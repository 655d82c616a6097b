//! Affine transforms for scene nodes.
//!
//! A [`Transform`] maps a node's local coordinates into its parent's frame.
//! Every operation composes with what is already there: `shift`, `scale`
//! and `rotate_about` act in the parent frame (applied after the existing
//! transform) while `translate_local` acts in the node's own frame (applied
//! before it).
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use paramsurf_scene::Transform;
//!
//! let mut t = Transform::new().with_translation(Vec3::new(1.0, 0.0, 0.0));
//! t.shift(Vec3::new(0.0, 2.0, 0.0));
//!
//! let p = t.transform_point(Vec3::ZERO);
//! assert!((p - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-6);
//! ```

use glam::{Mat4, Quat, Vec3};

/// Local-to-parent affine transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    matrix: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }
}

impl Transform {
    /// Identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decompose an affine matrix into a transform
    pub fn from_matrix(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Builder: start from a translation.
    pub fn with_translation(mut self, offset: Vec3) -> Self {
        self.shift(offset);
        self
    }

    /// Builder: scale uniformly about the origin.
    pub fn with_scale(mut self, factor: f32) -> Self {
        self.scale_about(factor, Vec3::ZERO);
        self
    }

    /// Get the transform as a matrix
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Where the local origin lands in the parent frame.
    pub fn translation(&self) -> Vec3 {
        self.matrix.w_axis.truncate()
    }

    /// True if the transform leaves points unchanged
    pub fn is_identity(&self) -> bool {
        self.matrix == Mat4::IDENTITY
    }

    /// Move by `offset` in the parent frame.
    pub fn shift(&mut self, offset: Vec3) {
        self.matrix = Mat4::from_translation(offset) * self.matrix;
    }

    /// Move by `offset` in the node's own frame.
    pub fn translate_local(&mut self, offset: Vec3) {
        self.matrix *= Mat4::from_translation(offset);
    }

    /// Scale uniformly about `center` (parent frame).
    pub fn scale_about(&mut self, factor: f32, center: Vec3) {
        let about = Mat4::from_translation(center)
            * Mat4::from_scale(Vec3::splat(factor))
            * Mat4::from_translation(-center);
        self.matrix = about * self.matrix;
    }

    /// Rotate by `angle` radians about `axis` through `point` (parent frame).
    ///
    /// A zero-length axis leaves the transform unchanged.
    pub fn rotate_about(&mut self, angle: f32, axis: Vec3, point: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        let about = Mat4::from_translation(point)
            * Mat4::from_quat(Quat::from_axis_angle(axis, angle))
            * Mat4::from_translation(-point);
        self.matrix = about * self.matrix;
    }

    /// This transform followed by `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            matrix: next.matrix * self.matrix,
        }
    }

    /// Map a point from the local frame to the parent frame
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.matrix.transform_point3(point)
    }

    /// Get the normal matrix (inverse transpose) of `model`.
    ///
    /// The normal matrix is used for transforming normal vectors correctly
    /// when the model matrix contains non-uniform scaling.
    ///
    /// # Non-invertible transforms
    ///
    /// If the matrix is not invertible (e.g., contains zero scale),
    /// the identity matrix is returned as a fallback to avoid NaN/Inf values.
    pub fn normal_matrix(model: Mat4) -> Mat4 {
        const EPSILON: f32 = 1e-6;
        if model.determinant().abs() < EPSILON {
            Mat4::IDENTITY
        } else {
            model.inverse().transpose()
        }
    }
}
