//! Parametric surface geometry.
//!
//! This crate turns mathematical functions into renderable buffers:
//! - uv grids and parametric mesh generation
//! - scalar-field colorization through colormaps
//! - surfaces (mesh, fill, opacity) and the vertex handoff format

pub mod color;
pub mod colorize;
pub mod colormap;
pub mod mesh;
pub mod surface;
pub mod vertex;

pub use color::Color;
pub use colorize::{colorize, try_colorize};
pub use colormap::{ColorMap, ColorStop, ScalarRange};
pub use mesh::{Mesh, UvGrid, generate, try_generate};
pub use surface::{Fill, Surface};
pub use vertex::SurfaceVertex;
