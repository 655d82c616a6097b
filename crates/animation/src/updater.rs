//! Per-frame update callbacks attached to scene targets.
//!
//! An [`UpdaterRegistry`] maps target keys (e.g. scene node paths) to
//! ordered lists of callbacks. Once per frame the driver calls
//! [`UpdaterRegistry::stage`]: the whole store is cloned once and every
//! callback runs in place on that clone, so a callback sees the writes of
//! every callback that ran before it, including ones on nested targets.
//! [`UpdaterRegistry::commit`] then swaps the clone in. If any callback
//! fails, nothing is written and the store keeps the state of the last
//! committed frame.

use std::fmt;

use paramsurf_core::Result;
use tracing::{trace, warn};

use crate::Trackers;

/// Callback invoked once per frame with the target, tracker values and alpha.
pub type UpdaterFn<T> = Box<dyn FnMut(&mut T, &Trackers, f32) -> Result<()> + Send>;

/// Identifier returned by [`UpdaterRegistry::register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UpdaterId(u64);

/// Identifier of an animation beat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeatId(pub u64);

/// How long an updater stays registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifetime {
    /// Every frame until unregistered
    Standing,
    /// Until the given beat finishes or is cancelled
    Beat(BeatId),
}

/// Alpha values handed to callbacks for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameAlpha {
    /// Alpha for standing updaters
    pub standing: f32,
    /// Running beat and its eased alpha
    pub beat: Option<(BeatId, f32)>,
}

impl FrameAlpha {
    /// Alpha for a frame with no running beat.
    pub const IDLE: Self = Self {
        standing: 1.0,
        beat: None,
    };

    fn for_lifetime(&self, lifetime: Lifetime) -> f32 {
        match (lifetime, self.beat) {
            (Lifetime::Standing, _) => self.standing,
            (Lifetime::Beat(id), Some((running, alpha))) if id == running => alpha,
            (Lifetime::Beat(_), _) => 1.0,
        }
    }
}

/// Resolves update targets by key.
///
/// Keys may overlap (a group and one of its children); callbacks always
/// reach the target through the store, so both see one consistent state.
pub trait TargetStore<K, T> {
    /// Get the target stored under `key`
    fn target(&self, key: &K) -> Option<&T>;
    /// Get the target stored under `key` for writing
    fn target_mut(&mut self, key: &K) -> Option<&mut T>;
}

struct Entry<T> {
    id: UpdaterId,
    lifetime: Lifetime,
    callback: UpdaterFn<T>,
}

struct TargetGroup<K, T> {
    key: K,
    entries: Vec<Entry<T>>,
}

/// Store state produced by [`UpdaterRegistry::stage`], not yet committed.
#[derive(Debug)]
pub struct Staged<S> {
    store: S,
    updated: usize,
}

impl<S> Staged<S> {
    /// Get the staged store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Number of targets whose callbacks ran.
    pub fn updated(&self) -> usize {
        self.updated
    }
}

/// Ordered per-target update callbacks.
///
/// Callbacks on one target run in registration order; targets run in the
/// order they first received a callback.
pub struct UpdaterRegistry<K, T> {
    groups: Vec<TargetGroup<K, T>>,
    next_id: u64,
}

impl<K, T> Default for UpdaterRegistry<K, T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K: fmt::Debug, T> fmt::Debug for UpdaterRegistry<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.groups.iter().map(|g| (&g.key, g.entries.len())))
            .finish()
    }
}

impl<K, T> UpdaterRegistry<K, T>
where
    K: Clone + PartialEq + fmt::Debug,
{
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a callback to `key`.
    pub fn register<F>(&mut self, key: K, lifetime: Lifetime, callback: F) -> UpdaterId
    where
        F: FnMut(&mut T, &Trackers, f32) -> Result<()> + Send + 'static,
    {
        let id = UpdaterId(self.next_id);
        self.next_id += 1;

        let entry = Entry {
            id,
            lifetime,
            callback: Box::new(callback),
        };
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.entries.push(entry),
            None => self.groups.push(TargetGroup {
                key,
                entries: vec![entry],
            }),
        }
        id
    }

    /// Remove a callback. Unknown ids are ignored; returns whether one was removed.
    pub fn unregister(&mut self, key: &K, id: UpdaterId) -> bool {
        let Some(index) = self.groups.iter().position(|g| &g.key == key) else {
            return false;
        };
        let group = &mut self.groups[index];
        let before = group.entries.len();
        group.entries.retain(|e| e.id != id);
        let removed = group.entries.len() != before;
        if group.entries.is_empty() {
            self.groups.remove(index);
        }
        removed
    }

    /// Remove every callback bound to `beat`; returns how many were removed.
    pub fn retire_beat(&mut self, beat: BeatId) -> usize {
        let mut removed = 0;
        for group in &mut self.groups {
            let before = group.entries.len();
            group.entries.retain(|e| e.lifetime != Lifetime::Beat(beat));
            removed += before - group.entries.len();
        }
        self.groups.retain(|g| !g.entries.is_empty());
        removed
    }

    /// Remove every callback on `key`.
    pub fn clear_target(&mut self, key: &K) -> usize {
        match self.groups.iter().position(|g| &g.key == key) {
            Some(index) => self.groups.remove(index).entries.len(),
            None => 0,
        }
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len()).sum()
    }

    /// True when no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of callbacks registered on `key`.
    pub fn count_for(&self, key: &K) -> usize {
        self.groups
            .iter()
            .find(|g| &g.key == key)
            .map_or(0, |g| g.entries.len())
    }

    /// Run every callback on one clone of `store`.
    ///
    /// Targets run in order, each one's callbacks in registration order, all
    /// against the same clone. The first failing callback aborts the pass
    /// and its error is returned unchanged; `store` is never touched.
    pub fn stage<S>(&mut self, store: &S, trackers: &Trackers, alpha: FrameAlpha) -> Result<Staged<S>>
    where
        S: TargetStore<K, T> + Clone,
    {
        let mut staged = store.clone();
        let updated = self.apply(&mut staged, trackers, alpha)?;
        trace!("Staged {} update targets", updated);
        Ok(Staged {
            store: staged,
            updated,
        })
    }

    /// Replace `store` with a staged state; returns the number of updated targets.
    pub fn commit<S>(store: &mut S, staged: Staged<S>) -> usize {
        *store = staged.store;
        staged.updated
    }

    /// Stage and commit in one step; returns the number of updated targets.
    pub fn run<S>(&mut self, store: &mut S, trackers: &Trackers, alpha: FrameAlpha) -> Result<usize>
    where
        S: TargetStore<K, T> + Clone,
    {
        let staged = self.stage(store, trackers, alpha)?;
        Ok(Self::commit(store, staged))
    }

    fn apply<S>(&mut self, store: &mut S, trackers: &Trackers, alpha: FrameAlpha) -> Result<usize>
    where
        S: TargetStore<K, T>,
    {
        let mut updated = 0;
        for group in &mut self.groups {
            let Some(target) = store.target_mut(&group.key) else {
                warn!("Skipping updaters for missing target {:?}", group.key);
                continue;
            };
            for entry in &mut group.entries {
                (entry.callback)(&mut *target, trackers, alpha.for_lifetime(entry.lifetime))?;
            }
            updated += 1;
        }
        Ok(updated)
    }
}
