//! Time-driven parameter animation.
//!
//! This crate provides the animation primitives of the engine:
//! - Easing curves
//! - Tweens with observable completion
//! - Trackers: named scalar parameters read by surface functions
//! - The per-frame updater registry

pub mod easing;
pub mod tracker;
pub mod tween;
pub mod updater;

pub use easing::Easing;
pub use tracker::{Tracker, TrackerId, Trackers};
pub use tween::{Tween, TweenHandle, TweenStatus};
pub use updater::{
    BeatId, FrameAlpha, Lifetime, Staged, TargetStore, UpdaterFn, UpdaterId, UpdaterRegistry,
};
