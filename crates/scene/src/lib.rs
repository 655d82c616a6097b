//! Scene composition and frame driving.
//!
//! This crate provides scene management:
//! - Transform hierarchy and the scene graph
//! - Orbit camera and the camera/light orbit controller
//! - Point light
//! - The stage that advances a session one frame at a time

pub mod camera;
pub mod graph;
pub mod light;
pub mod stage;
pub mod transform;

pub use camera::{OrbitCamera, OrbitController};
pub use graph::{NodeKind, NodePath, RenderItem, SceneGraph, SceneNode};
pub use light::{PointLight, rotate_z};
pub use stage::{Beat, BeatHandle, FrameReport, Stage};
pub use transform::Transform;
