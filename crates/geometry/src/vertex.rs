//! Vertex format handed to a rendering backend.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::Color;

/// Surface vertex with position, normal and color.
///
/// # Memory Layout
///
/// - Offset 0: position (12 bytes)
/// - Offset 12: normal (12 bytes)
/// - Offset 24: color (16 bytes)
/// - Total size: 40 bytes
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Color,
}

impl SurfaceVertex {
    #[inline]
    /// Create a vertex
    pub const fn new(position: Vec3, normal: Vec3, color: Color) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }

    /// Size of one vertex in bytes.
    pub const fn stride() -> usize {
        std::mem::size_of::<Self>()
    }
}
