//! Core utilities for the paramsurf engine.
//!
//! This crate provides foundational types and utilities used across the engine:
//! - Error types and result aliases
//! - Logging initialization
//! - Fixed-step frame clock
//! - Configuration management

mod clock;
mod config;
mod error;
mod logging;

pub use clock::{FrameClock, FrameTick};
pub use config::{DEFAULT_EPSILON, DEFAULT_FRAME_RATE, DEFAULT_RESOLUTION, EngineConfig};
pub use error::{BoxError, Error, Result};
pub use logging::init_logging;
