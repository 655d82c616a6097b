//! Time-bounded interpolation of a single scalar.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use paramsurf_core::{Error, Result};

use crate::Easing;

/// Lifecycle of a tween as seen through its [`TweenHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TweenStatus {
    /// Scheduled and not yet at alpha 1
    Running,
    /// Reached alpha 1; the tracker holds the end value
    Completed,
    /// Replaced or interrupted before completing
    Cancelled,
}

impl TweenStatus {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => TweenStatus::Completed,
            2 => TweenStatus::Cancelled,
            _ => TweenStatus::Running,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            TweenStatus::Running => 0,
            TweenStatus::Completed => 1,
            TweenStatus::Cancelled => 2,
        }
    }
}

/// Observable completion of a scheduled tween.
///
/// Handles are cheap to clone and can be polled from the scripting side to
/// decide when to move to the next step.
#[derive(Clone, Debug)]
pub struct TweenHandle {
    status: Arc<AtomicU8>,
}

impl TweenHandle {
    fn new() -> Self {
        Self {
            status: Arc::new(AtomicU8::new(TweenStatus::Running.as_u8())),
        }
    }

    /// Get the current status
    pub fn status(&self) -> TweenStatus {
        TweenStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    /// True once the tween completed or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.status() != TweenStatus::Running
    }

    /// True once the tween reached its end value
    pub fn is_completed(&self) -> bool {
        self.status() == TweenStatus::Completed
    }

    /// True if both handles observe the same tween.
    pub fn same_as(&self, other: &TweenHandle) -> bool {
        Arc::ptr_eq(&self.status, &other.status)
    }

    fn mark(&self, status: TweenStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }
}

/// Interpolation from `start` to `end` over `duration` seconds.
///
/// Progress is driven from outside, either by elapsed time
/// ([`Tween::advance`]) or by a raw alpha ([`Tween::apply_alpha`]). Alpha
/// never moves backwards.
#[derive(Clone, Debug)]
pub struct Tween {
    start: f32,
    end: f32,
    duration: f32,
    easing: Easing,
    elapsed: f32,
    alpha: f32,
    handle: TweenHandle,
}

impl Tween {
    /// Create a tween, validating duration, end value and easing.
    pub fn new(start: f32, end: f32, duration: f32, easing: Easing) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::InvalidTween(format!(
                "duration must be a non-negative finite number, got {duration}"
            )));
        }
        if !end.is_finite() {
            return Err(Error::InvalidTween(format!("target must be finite, got {end}")));
        }
        easing.validate()?;

        Ok(Self {
            start,
            end,
            duration,
            easing,
            elapsed: 0.0,
            alpha: 0.0,
            handle: TweenHandle::new(),
        })
    }

    /// Get the start value
    pub fn start(&self) -> f32 {
        self.start
    }

    /// Get the end value
    pub fn end(&self) -> f32 {
        self.end
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Get the easing curve
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Last applied raw alpha.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Get the completion handle
    pub fn handle(&self) -> &TweenHandle {
        &self.handle
    }

    /// True once alpha reached 1
    pub fn is_done(&self) -> bool {
        self.alpha >= 1.0
    }

    /// Value at the last applied alpha; exactly `end` once done.
    pub fn value(&self) -> f32 {
        if self.is_done() {
            self.end
        } else {
            self.start + self.easing.apply(self.alpha) * (self.end - self.start)
        }
    }

    /// Eased fraction of the last applied alpha.
    pub fn eased_alpha(&self) -> f32 {
        self.easing.apply(self.alpha)
    }

    /// Advance by `dt` seconds and return the new raw alpha.
    ///
    /// A zero-duration tween finishes on its first step.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        let alpha = if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        };
        self.apply_alpha(alpha)
    }

    /// Apply an externally supplied alpha, clamped to `[0, 1]`.
    ///
    /// An alpha lower than the last applied one is ignored.
    pub fn apply_alpha(&mut self, alpha: f32) -> f32 {
        let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        if alpha > self.alpha {
            self.alpha = alpha;
        }
        self.alpha
    }

    pub(crate) fn complete(&self) {
        self.handle.mark(TweenStatus::Completed);
    }

    pub(crate) fn cancel(&self) {
        self.handle.mark(TweenStatus::Cancelled);
    }

    pub(crate) fn reopen(&self) {
        self.handle.mark(TweenStatus::Running);
    }
}
