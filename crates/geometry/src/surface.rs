//! Renderable surfaces: a mesh plus its fill and opacity.

use glam::Vec3;
use paramsurf_core::{BoxError, Error, Result};

use crate::colorize::{colorize, try_colorize};
use crate::{Color, ColorMap, Mesh, ScalarRange, SurfaceVertex};

/// How a surface is colored.
#[derive(Clone, Debug, PartialEq)]
pub enum Fill {
    /// One color for every point
    Uniform(Color),
    /// One color per mesh point, parallel to [`Mesh::points`]
    PerVertex(Vec<Color>),
}

impl Fill {
    /// True if the fill can color a mesh of `len` points.
    pub fn fits(&self, len: usize) -> bool {
        match self {
            Fill::Uniform(_) => true,
            Fill::PerVertex(colors) => colors.len() == len,
        }
    }

    /// Blend towards a uniform `target` color.
    pub fn lerp_to(&self, target: Color, t: f32) -> Fill {
        match self {
            Fill::Uniform(c) => Fill::Uniform(c.lerp(target, t)),
            Fill::PerVertex(colors) => {
                Fill::PerVertex(colors.iter().map(|c| c.lerp(target, t)).collect())
            }
        }
    }
}

/// A parametric mesh with color and opacity.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    mesh: Mesh,
    fill: Fill,
    opacity: f32,
}

impl Surface {
    /// Create a uniformly colored surface. Opacity is clamped to `[0, 1]`.
    pub fn new(mesh: Mesh, color: Color, opacity: f32) -> Self {
        Self {
            mesh,
            fill: Fill::Uniform(color),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }

    /// Get the mesh
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Replace the mesh; per-vertex colors are dropped if the point count changes.
    pub fn set_mesh(&mut self, mesh: Mesh) {
        if let Fill::PerVertex(colors) = &self.fill
            && colors.len() != mesh.len()
        {
            let first = colors.first().copied().unwrap_or(Color::WHITE);
            self.fill = Fill::Uniform(first);
        }
        self.mesh = mesh;
    }

    /// Resample the mesh over its grid.
    pub fn regenerate<F>(&mut self, uv_fn: F)
    where
        F: Fn(f32, f32) -> Vec3,
    {
        self.mesh.regenerate(uv_fn);
    }

    /// Resample with a fallible function; the mesh is untouched on error.
    pub fn try_regenerate<F, E>(&mut self, uv_fn: F) -> Result<()>
    where
        F: Fn(f32, f32) -> std::result::Result<Vec3, E>,
        E: Into<BoxError>,
    {
        self.mesh.try_regenerate(uv_fn)
    }

    /// Get the fill
    pub fn fill(&self) -> &Fill {
        &self.fill
    }

    /// Replace the fill.
    ///
    /// Fails with [`Error::Scene`] if a per-vertex fill does not have one
    /// color per mesh point; the fill is untouched on error.
    pub fn set_fill(&mut self, fill: Fill) -> Result<()> {
        if let Fill::PerVertex(colors) = &fill
            && !fill.fits(self.mesh.len())
        {
            return Err(Error::Scene(format!(
                "fill has {} colors for {} points",
                colors.len(),
                self.mesh.len()
            )));
        }
        self.fill = fill;
        Ok(())
    }

    /// Blend from `from` towards `target`.
    ///
    /// If `from` no longer fits the mesh, the current fill is blended instead.
    pub fn blend_fill(&mut self, from: &Fill, target: Color, t: f32) {
        self.fill = if from.fits(self.mesh.len()) {
            from.lerp_to(target, t)
        } else {
            self.fill.lerp_to(target, t)
        };
    }

    /// The uniform color, if the surface is not colored per vertex.
    pub fn color(&self) -> Option<Color> {
        match self.fill {
            Fill::Uniform(c) => Some(c),
            Fill::PerVertex(_) => None,
        }
    }

    /// Color every point the same, discarding per-vertex colors.
    pub fn set_color(&mut self, color: Color) {
        self.fill = Fill::Uniform(color);
    }

    /// Color each point from a scalar field evaluated at the current points.
    pub fn set_color_by_field<F>(&mut self, field: F, colormap: &ColorMap, range: ScalarRange)
    where
        F: Fn(Vec3) -> f32,
    {
        self.fill = Fill::PerVertex(colorize(self.mesh.points(), field, colormap, range));
    }

    /// Like [`Surface::set_color_by_field`]; the fill is untouched on error.
    pub fn try_set_color_by_field<F, E>(
        &mut self,
        field: F,
        colormap: &ColorMap,
        range: ScalarRange,
    ) -> Result<()>
    where
        F: Fn(Vec3) -> std::result::Result<f32, E>,
        E: Into<BoxError>,
    {
        let colors = try_colorize(self.mesh.points(), field, colormap, range)?;
        self.fill = Fill::PerVertex(colors);
        Ok(())
    }

    /// Get the opacity
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set opacity, clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// One color per point with opacity folded into alpha.
    pub fn point_colors(&self) -> Vec<Color> {
        match &self.fill {
            Fill::Uniform(c) => vec![c.with_alpha(c.a * self.opacity); self.mesh.len()],
            Fill::PerVertex(colors) => colors
                .iter()
                .map(|c| c.with_alpha(c.a * self.opacity))
                .collect(),
        }
    }

    /// Interleaved vertices in the surface's local frame.
    pub fn vertices(&self) -> Vec<SurfaceVertex> {
        self.mesh
            .points()
            .iter()
            .zip(self.mesh.unit_normals())
            .zip(self.point_colors())
            .map(|((&p, n), c)| SurfaceVertex::new(p, n, c))
            .collect()
    }
}
