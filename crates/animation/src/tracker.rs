//! Named scalar parameters that can be set directly or tweened.
//!
//! A [`Tracker`] holds one value and at most one active [`Tween`]; starting a
//! new tween or setting the value replaces the running one (latest wins) and
//! reports it as cancelled. [`Trackers`] is the per-session registry that
//! surface and field functions read from.
//!
//! # Example
//!
//! ```
//! use paramsurf_animation::{Easing, Trackers};
//!
//! let mut trackers = Trackers::new();
//! let radius = trackers.add("radius", 0.1);
//!
//! let handle = trackers.animate_to(radius, 3.0, 2.0, Easing::Linear).unwrap();
//! trackers.advance(1.0);
//! assert!((trackers.value(radius).unwrap() - 1.55).abs() < 1e-5);
//!
//! trackers.advance(1.0);
//! assert_eq!(trackers.value(radius).unwrap(), 3.0);
//! assert!(handle.is_completed());
//! ```

use paramsurf_core::{Error, Result};
use tracing::debug;

use crate::{Easing, Tween, TweenHandle};

/// A scalar value, optionally driven by a tween.
#[derive(Clone, Debug)]
pub struct Tracker {
    value: f32,
    tween: Option<Tween>,
}

impl Tracker {
    /// Create a tracker holding `value`
    pub fn new(value: f32) -> Self {
        Self { value, tween: None }
    }

    /// Current value, consistent with the last applied alpha.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// True while a tween is running
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// The running tween, if any.
    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    /// Set the value immediately, cancelling any running tween.
    pub fn set(&mut self, value: f32) {
        self.cancel();
        self.value = value;
    }

    /// Schedule a tween from the current value to `target`.
    ///
    /// A running tween is cancelled first; its completion is never reported.
    /// Invalid arguments are rejected before anything changes.
    pub fn animate_to(&mut self, target: f32, duration: f32, easing: Easing) -> Result<TweenHandle> {
        let tween = Tween::new(self.value, target, duration, easing)?;
        self.cancel();
        let handle = tween.handle().clone();
        self.tween = Some(tween);
        Ok(handle)
    }

    /// Stop the running tween where it is.
    pub fn cancel(&mut self) {
        if let Some(tween) = self.tween.take() {
            tween.cancel();
        }
    }

    /// Drive the running tween with an external alpha.
    ///
    /// Returns the handle of the tween if this call completed it.
    pub fn apply_alpha(&mut self, alpha: f32) -> Option<TweenHandle> {
        let tween = self.tween.as_mut()?;
        tween.apply_alpha(alpha);
        self.settle()
    }

    /// Drive the running tween by elapsed time.
    ///
    /// Returns the handle of the tween if this call completed it.
    pub fn advance(&mut self, dt: f32) -> Option<TweenHandle> {
        let tween = self.tween.as_mut()?;
        tween.advance(dt);
        self.settle()
    }

    fn settle(&mut self) -> Option<TweenHandle> {
        let tween = self.tween.as_ref()?;
        self.value = tween.value();
        if !tween.is_done() {
            return None;
        }
        let tween = self.tween.take()?;
        tween.complete();
        Some(tween.handle().clone())
    }

    /// Roll back to `snapshot`, an earlier clone of this tracker.
    ///
    /// A tween that completed after the snapshot was taken is reported as
    /// running again.
    pub fn restore(&mut self, snapshot: Tracker) {
        if let Some(tween) = &snapshot.tween {
            tween.reopen();
        }
        *self = snapshot;
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Identifier of a tracker inside a [`Trackers`] registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerId(usize);

/// Registry of named trackers for one session.
#[derive(Clone, Debug, Default)]
pub struct Trackers {
    entries: Vec<(String, Tracker)>,
}

impl Trackers {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tracker with an initial value.
    pub fn add(&mut self, name: impl Into<String>, value: f32) -> TrackerId {
        let name = name.into();
        debug!("Added tracker '{}' = {}", name, value);
        self.entries.push((name, Tracker::new(value)));
        TrackerId(self.entries.len() - 1)
    }

    /// First tracker registered under `name`.
    pub fn find(&self, name: &str) -> Option<TrackerId> {
        self.entries.iter().position(|(n, _)| n == name).map(TrackerId)
    }

    /// Get the name a tracker was registered under
    pub fn name(&self, id: TrackerId) -> Option<&str> {
        self.entries.get(id.0).map(|(n, _)| n.as_str())
    }

    /// Get a tracker
    pub fn get(&self, id: TrackerId) -> Option<&Tracker> {
        self.entries.get(id.0).map(|(_, t)| t)
    }

    /// Get a tracker for direct control
    pub fn get_mut(&mut self, id: TrackerId) -> Option<&mut Tracker> {
        self.entries.get_mut(id.0).map(|(_, t)| t)
    }

    fn require(&mut self, id: TrackerId) -> Result<&mut Tracker> {
        let len = self.entries.len();
        self.get_mut(id)
            .ok_or_else(|| Error::InvalidTween(format!("unknown tracker #{} of {}", id.0, len)))
    }

    /// Current value of a tracker.
    ///
    /// Fails with [`Error::InvalidTween`] if `id` was not returned by this
    /// registry.
    pub fn value(&self, id: TrackerId) -> Result<f32> {
        self.get(id).map(Tracker::value).ok_or_else(|| {
            Error::InvalidTween(format!("unknown tracker #{} of {}", id.0, self.entries.len()))
        })
    }

    /// Set a tracker immediately, cancelling its tween.
    pub fn set(&mut self, id: TrackerId, value: f32) -> Result<()> {
        self.require(id)?.set(value);
        Ok(())
    }

    /// Schedule a tween on a tracker.
    pub fn animate_to(
        &mut self,
        id: TrackerId,
        target: f32,
        duration: f32,
        easing: Easing,
    ) -> Result<TweenHandle> {
        let handle = self.require(id)?.animate_to(target, duration, easing)?;
        debug!(
            "Tracker '{}' -> {} over {}s ({:?})",
            self.entries[id.0].0, target, duration, easing
        );
        Ok(handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True while any tracker has a running tween.
    pub fn is_animating(&self) -> bool {
        self.entries.iter().any(|(_, t)| t.is_animating())
    }

    /// Advance every running tween by the same `dt`.
    ///
    /// Tweens scheduled between the same two calls share an elapsed-time
    /// basis and stay in lockstep. Returns the handles completed by this call.
    pub fn advance(&mut self, dt: f32) -> Vec<TweenHandle> {
        let mut completed = Vec::new();
        for (name, tracker) in &mut self.entries {
            if let Some(handle) = tracker.advance(dt) {
                debug!("Tracker '{}' reached {}", name, tracker.value());
                completed.push(handle);
            }
        }
        completed
    }

    /// Roll back to `snapshot`, an earlier clone of this registry.
    pub fn restore(&mut self, snapshot: Trackers) {
        for (_, tracker) in &snapshot.entries {
            if let Some(tween) = tracker.tween() {
                tween.reopen();
            }
        }
        *self = snapshot;
    }
}
