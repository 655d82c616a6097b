//! Point light for the scene.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Rotate `point` by `angle` radians about the world z-axis.
///
/// `z` is unchanged: `(cos·x − sin·y, sin·x + cos·y, z)`.
#[inline]
/// Rotate `point` about the world z-axis by `angle` radians
pub fn rotate_z(point: Vec3, angle: f32) -> Vec3 {
    let (s, c) = angle.sin_cos();
    Vec3::new(c * point.x - s * point.y, s * point.x + c * point.y, point.z)
}

/// A point light (omnidirectional).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointLight {
    /// Light position in world space
    pub position: Vec3,
    /// Attenuation radius
    pub radius: f32,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(-10.0, 10.0, 10.0),
            radius: 100.0,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

impl PointLight {
    /// White light at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Move the light to `position`
    pub fn move_to(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Same light rotated about the world z-axis.
    pub fn rotated_about_z(&self, angle: f32) -> Self {
        Self {
            position: rotate_z(self.position, angle),
            ..*self
        }
    }
}
