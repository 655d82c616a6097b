//! Parametric surface meshes sampled over a uv grid.
//!
//! A [`UvGrid`] describes where a uv function is sampled; [`generate`]
//! evaluates the function over it and produces a [`Mesh`] holding three
//! parallel point buffers:
//!
//! - the surface points themselves,
//! - the points nudged by `epsilon` along `u`,
//! - the points nudged by `epsilon` along `v`.
//!
//! The nudged buffers are finite-difference samples used for normal
//! estimation ([`Mesh::unit_normals`]).
//!
//! Buffers are laid out row-major with `u` as the outer index, so the sample
//! `(i, j)` lives at `i * nv + j`.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use paramsurf_geometry::{UvGrid, generate};
//!
//! let grid = UvGrid::new((0.0, 1.0), (0.0, 1.0), (2, 2)).unwrap();
//! let mesh = generate(|u, v| Vec3::new(u, v, 0.0), &grid);
//!
//! assert_eq!(mesh.points()[1], Vec3::new(0.0, 1.0, 0.0));
//! assert_eq!(mesh.points()[2], Vec3::new(1.0, 0.0, 0.0));
//! ```

use std::convert::Infallible;

use glam::Vec3;
use paramsurf_core::{BoxError, DEFAULT_EPSILON, Error, Result};
use tracing::trace;

/// Sampling domain of a parametric surface.
#[derive(Clone, Debug, PartialEq)]
pub struct UvGrid {
    u_range: (f32, f32),
    v_range: (f32, f32),
    resolution: (usize, usize),
    epsilon: f32,
}

impl UvGrid {
    /// Create a grid of `nu x nv` samples over the given ranges.
    ///
    /// Both ranges must be finite and strictly increasing, and the
    /// resolution at least 2x2. The finite-difference offset defaults to
    /// [`DEFAULT_EPSILON`].
    pub fn new(u_range: (f32, f32), v_range: (f32, f32), resolution: (usize, usize)) -> Result<Self> {
        check_range("u_range", u_range)?;
        check_range("v_range", v_range)?;

        let (nu, nv) = resolution;
        if nu < 2 || nv < 2 {
            return Err(Error::InvalidDomain(format!(
                "resolution must be at least 2x2, got {nu}x{nv}"
            )));
        }

        Ok(Self {
            u_range,
            v_range,
            resolution,
            epsilon: DEFAULT_EPSILON,
        })
    }

    /// Replace the finite-difference offset.
    pub fn with_epsilon(mut self, epsilon: f32) -> Result<Self> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(Error::InvalidDomain(format!(
                "epsilon must be a positive finite number, got {epsilon}"
            )));
        }
        self.epsilon = epsilon;
        Ok(self)
    }

    /// Get the u range
    pub fn u_range(&self) -> (f32, f32) {
        self.u_range
    }

    /// Get the v range
    pub fn v_range(&self) -> (f32, f32) {
        self.v_range
    }

    /// Get the sample counts along u and v
    pub fn resolution(&self) -> (usize, usize) {
        self.resolution
    }

    /// Get the finite-difference offset
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Total number of samples, `nu * nv`.
    pub fn len(&self) -> usize {
        self.resolution.0 * self.resolution.1
    }

    /// Always false: a valid grid holds at least four samples.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Buffer index of sample `(i, j)`.
    #[inline]
    /// Row-major buffer index of sample `(i, j)`
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.resolution.1 + j
    }

    /// Evenly spaced `u` values, endpoints included.
    pub fn u_values(&self) -> Vec<f32> {
        linspace(self.u_range, self.resolution.0)
    }

    /// Evenly spaced `v` values, endpoints included.
    pub fn v_values(&self) -> Vec<f32> {
        linspace(self.v_range, self.resolution.1)
    }
}

fn check_range(name: &str, (lo, hi): (f32, f32)) -> Result<()> {
    if !(lo.is_finite() && hi.is_finite()) {
        return Err(Error::InvalidDomain(format!(
            "{name} bounds must be finite, got [{lo}, {hi}]"
        )));
    }
    if lo >= hi {
        return Err(Error::InvalidDomain(format!(
            "{name} must be strictly increasing, got [{lo}, {hi}]"
        )));
    }
    Ok(())
}

fn linspace((lo, hi): (f32, f32), count: usize) -> Vec<f32> {
    let last = (count - 1) as f32;
    (0..count)
        .map(|i| {
            if i + 1 == count {
                hi
            } else {
                lo + (hi - lo) * (i as f32 / last)
            }
        })
        .collect()
}

/// Point buffers of a surface sampled over a [`UvGrid`].
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    grid: UvGrid,
    points: Vec<Vec3>,
    du_points: Vec<Vec3>,
    dv_points: Vec<Vec3>,
}

struct Buffers {
    points: Vec<Vec3>,
    du_points: Vec<Vec3>,
    dv_points: Vec<Vec3>,
}

fn sample_buffers<E>(
    grid: &UvGrid,
    f: &impl Fn(f32, f32) -> std::result::Result<Vec3, E>,
) -> std::result::Result<Buffers, E> {
    let us = grid.u_values();
    let vs = grid.v_values();
    let eps = grid.epsilon;

    let mut points = Vec::with_capacity(grid.len());
    let mut du_points = Vec::with_capacity(grid.len());
    let mut dv_points = Vec::with_capacity(grid.len());

    for &u in &us {
        for &v in &vs {
            points.push(f(u, v)?);
            du_points.push(f(u + eps, v)?);
            dv_points.push(f(u, v + eps)?);
        }
    }

    Ok(Buffers {
        points,
        du_points,
        dv_points,
    })
}

/// Sample `uv_fn` over `grid`.
///
/// The function is evaluated afresh on every call; nothing is cached, so a
/// function reading tracker values sees their state at call time.
pub fn generate<F>(uv_fn: F, grid: &UvGrid) -> Mesh
where
    F: Fn(f32, f32) -> Vec3,
{
    let Ok(buffers) = sample_buffers::<Infallible>(grid, &|u, v| Ok(uv_fn(u, v)));
    trace!(
        "Generated {}x{} surface",
        grid.resolution.0, grid.resolution.1
    );
    Mesh::from_buffers(grid.clone(), buffers)
}

/// Sample a fallible `uv_fn` over `grid`.
///
/// The first error aborts sampling and is returned as
/// [`Error::Evaluation`] with the original error as its source.
pub fn try_generate<F, E>(uv_fn: F, grid: &UvGrid) -> Result<Mesh>
where
    F: Fn(f32, f32) -> std::result::Result<Vec3, E>,
    E: Into<BoxError>,
{
    let buffers = sample_buffers(grid, &uv_fn).map_err(Error::evaluation)?;
    Ok(Mesh::from_buffers(grid.clone(), buffers))
}

impl Mesh {
    fn from_buffers(grid: UvGrid, buffers: Buffers) -> Self {
        Self {
            grid,
            points: buffers.points,
            du_points: buffers.du_points,
            dv_points: buffers.dv_points,
        }
    }

    /// Get the grid the mesh was sampled on
    pub fn grid(&self) -> &UvGrid {
        &self.grid
    }

    pub fn resolution(&self) -> (usize, usize) {
        self.grid.resolution
    }

    /// Number of surface points, `nu * nv`.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the mesh has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Surface points, row-major.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Points sampled at `(u + epsilon, v)`.
    pub fn du_points(&self) -> &[Vec3] {
        &self.du_points
    }

    /// Points sampled at `(u, v + epsilon)`.
    pub fn dv_points(&self) -> &[Vec3] {
        &self.dv_points
    }

    /// Surface points as raw bytes (`3 x f32` per point).
    pub fn point_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    /// Resample over the same grid, replacing all three buffers at once.
    pub fn regenerate<F>(&mut self, uv_fn: F)
    where
        F: Fn(f32, f32) -> Vec3,
    {
        let Ok(buffers) = sample_buffers::<Infallible>(&self.grid, &|u, v| Ok(uv_fn(u, v)));
        self.install(buffers);
    }

    /// Resample with a fallible function.
    ///
    /// On error the existing buffers are left untouched.
    pub fn try_regenerate<F, E>(&mut self, uv_fn: F) -> Result<()>
    where
        F: Fn(f32, f32) -> std::result::Result<Vec3, E>,
        E: Into<BoxError>,
    {
        let buffers = sample_buffers(&self.grid, &uv_fn).map_err(Error::evaluation)?;
        self.install(buffers);
        Ok(())
    }

    fn install(&mut self, buffers: Buffers) {
        self.points = buffers.points;
        self.du_points = buffers.du_points;
        self.dv_points = buffers.dv_points;
    }

    /// Unit normals from the finite-difference tangents.
    ///
    /// Degenerate samples (e.g. the poles of a sphere) get a zero normal.
    pub fn unit_normals(&self) -> Vec<Vec3> {
        self.points
            .iter()
            .zip(&self.du_points)
            .zip(&self.dv_points)
            .map(|((&p, &du), &dv)| (du - p).cross(dv - p).normalize_or_zero())
            .collect()
    }

    /// Two triangles per grid cell, `ul, ur, dl` and `ur, dl, dr`.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let (nu, nv) = self.grid.resolution;
        let mut indices = Vec::with_capacity((nu - 1) * (nv - 1) * 6);
        for i in 0..nu - 1 {
            for j in 0..nv - 1 {
                let ul = self.grid.index(i, j) as u32;
                let ur = self.grid.index(i, j + 1) as u32;
                let dl = self.grid.index(i + 1, j) as u32;
                let dr = self.grid.index(i + 1, j + 1) as u32;
                indices.extend_from_slice(&[ul, ur, dl, ur, dl, dr]);
            }
        }
        indices
    }

    /// Axis-aligned bounds of the surface points.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}
