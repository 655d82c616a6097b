//! Frame driver for one animation session.
//!
//! A [`Stage`] owns the trackers, the scene graph, the updater registry and
//! the orbit controller of a session and advances them together, one frame
//! per [`Stage::advance`] call. Animations are grouped into [`Beat`]s that
//! share one elapsed-time basis; playing a beat cancels whatever is left of
//! the previous one.
//!
//! A frame either commits completely or not at all. If an updater fails,
//! trackers, the orbit, node animations and meshes are put back to where
//! the previous frame left them and the error is returned.
//!
//! # Example
//!
//! ```
//! use paramsurf_animation::Easing;
//! use paramsurf_core::FrameClock;
//! use paramsurf_scene::{Beat, Stage};
//!
//! let mut stage = Stage::new();
//! let radius = stage.trackers_mut().add("radius", 0.1);
//!
//! let beat = stage
//!     .play(Beat::new(2.0).with_easing(Easing::Linear).track(radius, 3.0))
//!     .unwrap();
//!
//! let mut clock = FrameClock::new(30);
//! stage.run_to_idle(&mut clock).unwrap();
//! assert!(beat.is_completed());
//! assert_eq!(stage.trackers().value(radius).unwrap(), 3.0);
//! ```
//!
//! # Nested targets
//!
//! All updaters of a frame run on one staged copy of the graph, so updaters
//! on a group and on its descendants compose: each sees what the ones
//! registered before it wrote.

use std::fmt;
use std::sync::{Arc, Mutex};

use glam::{Mat4, Vec3};
use paramsurf_animation::{
    BeatId, Easing, FrameAlpha, Lifetime, Tracker, TrackerId, Trackers, Tween, TweenHandle,
    TweenStatus, UpdaterFn, UpdaterId, UpdaterRegistry,
};
use paramsurf_core::{Error, FrameClock, Result};
use paramsurf_geometry::Color;
use tracing::{debug, trace, warn};

use crate::{NodePath, OrbitController, SceneGraph, SceneNode, Transform};

#[derive(Clone, Copy, Debug)]
struct Track {
    id: TrackerId,
    target: f32,
    duration: Option<f32>,
    easing: Option<Easing>,
}

#[derive(Clone, Copy, Debug)]
enum Motion {
    Shift(Vec3),
    MoveTo(Vec3),
    Recolor(Color),
    Fade(f32),
}

/// A group of animations that start together.
///
/// Everything in a beat runs for `run_time` seconds with the beat's easing
/// unless a tracker tween is given its own duration and easing with
/// [`Beat::track_with`].
pub struct Beat {
    run_time: f32,
    easing: Easing,
    tracks: Vec<Track>,
    orbit: Option<f32>,
    motions: Vec<(NodePath, Motion)>,
    updaters: Vec<(NodePath, UpdaterFn<SceneNode>)>,
}

impl Beat {
    /// An empty beat lasting `run_time` seconds with [`Easing::Smooth`].
    pub fn new(run_time: f32) -> Self {
        Self {
            run_time,
            easing: Easing::default(),
            tracks: Vec::new(),
            orbit: None,
            motions: Vec::new(),
            updaters: Vec::new(),
        }
    }

    /// Set the easing for every part of the beat without its own
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Tween a tracker to `target`.
    pub fn track(mut self, id: TrackerId, target: f32) -> Self {
        self.tracks.push(Track {
            id,
            target,
            duration: None,
            easing: None,
        });
        self
    }

    /// Tween a tracker with its own duration and easing.
    pub fn track_with(mut self, id: TrackerId, target: f32, duration: f32, easing: Easing) -> Self {
        self.tracks.push(Track {
            id,
            target,
            duration: Some(duration),
            easing: Some(easing),
        });
        self
    }

    /// Orbit the camera to azimuth `theta`, turning the light with it.
    pub fn orbit_to(mut self, theta: f32) -> Self {
        self.orbit = Some(theta);
        self
    }

    /// Shift a node by `offset` in its parent frame.
    pub fn shift(mut self, path: NodePath, offset: Vec3) -> Self {
        self.motions.push((path, Motion::Shift(offset)));
        self
    }

    /// Move a node so its center ends at `point`.
    pub fn move_to(mut self, path: NodePath, point: Vec3) -> Self {
        self.motions.push((path, Motion::MoveTo(point)));
        self
    }

    /// Blend every leaf under a node to `color`.
    pub fn recolor(mut self, path: NodePath, color: Color) -> Self {
        self.motions.push((path, Motion::Recolor(color)));
        self
    }

    /// Blend every leaf under a node to `opacity`.
    pub fn fade(mut self, path: NodePath, opacity: f32) -> Self {
        self.motions.push((path, Motion::Fade(opacity)));
        self
    }

    /// Run `callback` on a node every frame of this beat with the eased
    /// beat alpha. The updater is removed when the beat ends.
    pub fn update_with<F>(mut self, path: NodePath, callback: F) -> Self
    where
        F: FnMut(&mut SceneNode, &Trackers, f32) -> Result<()> + Send + 'static,
    {
        self.updaters.push((path, Box::new(callback)));
        self
    }

    /// Get the run time in seconds
    pub fn run_time(&self) -> f32 {
        self.run_time
    }

    /// Time until every part of the beat is done.
    pub fn duration(&self) -> f32 {
        self.tracks
            .iter()
            .filter_map(|t| t.duration)
            .fold(self.run_time, f32::max)
    }
}

impl fmt::Debug for Beat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Beat")
            .field("run_time", &self.run_time)
            .field("easing", &self.easing)
            .field("tracks", &self.tracks)
            .field("orbit", &self.orbit)
            .field("motions", &self.motions)
            .field("updaters", &self.updaters.len())
            .finish()
    }
}

/// Observable completion of a played beat.
#[derive(Clone, Debug)]
pub struct BeatHandle {
    id: BeatId,
    handle: TweenHandle,
}

impl BeatHandle {
    /// Get the beat id
    pub fn id(&self) -> BeatId {
        self.id
    }

    /// Get the current status
    pub fn status(&self) -> TweenStatus {
        self.handle.status()
    }

    /// True once the beat completed or was cancelled
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// True once the beat ran to the end
    pub fn is_completed(&self) -> bool {
        self.handle.is_completed()
    }
}

/// A node animation with its starting state.
#[derive(Clone, Debug)]
enum Effect {
    Shift(Vec3),
    Recolor(Color),
    Fade(f32),
}

#[derive(Clone, Debug)]
struct NodeAnimation {
    path: NodePath,
    effect: Effect,
    start: SceneNode,
}

impl NodeAnimation {
    fn apply(&self, node: &mut SceneNode, alpha: f32) {
        match self.effect {
            Effect::Shift(offset) => {
                let matrix = Mat4::from_translation(offset * alpha) * self.start.transform().matrix();
                node.set_transform(Transform::from_matrix(matrix));
            }
            Effect::Recolor(color) => node.blend_color_from(&self.start, color, alpha),
            Effect::Fade(opacity) => node.fade_from(&self.start, opacity, alpha),
        }
    }
}

#[derive(Debug)]
struct ActiveBeat {
    id: BeatId,
    /// Linear over the full duration; completes the beat handle
    clock: Tracker,
    /// Eased alpha over the run time
    progress: Tracker,
    tweens: Vec<(TrackerId, TweenHandle)>,
    orbit: Option<TweenHandle>,
    animations: Vec<NodeAnimation>,
}

/// State restored when a frame fails.
struct Snapshot {
    trackers: Trackers,
    orbit: OrbitController,
    beat: Option<(Tracker, Tracker)>,
    nodes: Vec<(NodePath, SceneNode)>,
}

/// What one call to [`Stage::advance`] did.
#[derive(Clone, Debug)]
pub struct FrameReport {
    /// Number of committed frames so far, this one included
    pub frame: u64,
    /// Running beat and its eased alpha
    pub beat: Option<(BeatId, f32)>,
    /// Tracker and orbit tweens completed this frame
    pub completed: Vec<TweenHandle>,
    /// Beat that ended this frame
    pub finished_beat: Option<BeatId>,
    /// Number of nodes written back by updaters
    pub updated_targets: usize,
}

/// One animation session.
#[derive(Debug, Default)]
pub struct Stage {
    trackers: Trackers,
    graph: SceneGraph,
    orbit: OrbitController,
    updaters: UpdaterRegistry<NodePath, SceneNode>,
    beat: Option<ActiveBeat>,
    next_beat: u64,
    frame: u64,
}

impl Stage {
    /// Create an empty stage with a default orbit controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: start from the given camera and light.
    pub fn with_orbit(mut self, orbit: OrbitController) -> Self {
        self.orbit = orbit;
        self
    }

    /// Get the trackers
    pub fn trackers(&self) -> &Trackers {
        &self.trackers
    }

    /// Get the trackers for registration and direct sets
    pub fn trackers_mut(&mut self) -> &mut Trackers {
        &mut self.trackers
    }

    /// Get the scene graph
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Get the scene graph for editing between frames
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Get the camera and light orbit controller
    pub fn orbit(&self) -> &OrbitController {
        &self.orbit
    }

    /// Get the orbit controller for editing between frames
    pub fn orbit_mut(&mut self) -> &mut OrbitController {
        &mut self.orbit
    }

    /// Number of committed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Number of registered updaters, standing and beat-bound.
    pub fn updater_count(&self) -> usize {
        self.updaters.len()
    }

    /// Attach a standing updater to the node at `path`.
    pub fn add_updater<F>(&mut self, path: NodePath, callback: F) -> Result<UpdaterId>
    where
        F: FnMut(&mut SceneNode, &Trackers, f32) -> Result<()> + Send + 'static,
    {
        if self.graph.node(&path).is_none() {
            return Err(Error::Scene(format!("no node at {path:?}")));
        }
        debug!("Registered updater on {:?}", path);
        Ok(self.updaters.register(path, Lifetime::Standing, callback))
    }

    /// Detach an updater. Unknown ids are ignored.
    pub fn remove_updater(&mut self, path: &NodePath, id: UpdaterId) -> bool {
        self.updaters.unregister(path, id)
    }

    /// Start a beat, cancelling what is left of the running one.
    ///
    /// Every part of the beat is checked first; on error nothing changes.
    pub fn play(&mut self, beat: Beat) -> Result<BeatHandle> {
        let duration = beat.duration();
        let mut clock = Tracker::new(0.0);
        let handle = clock.animate_to(1.0, duration, Easing::Linear)?;
        let mut progress = Tracker::new(0.0);
        progress.animate_to(1.0, beat.run_time, beat.easing)?;

        for track in &beat.tracks {
            if self.trackers.get(track.id).is_none() {
                return Err(Error::InvalidTween(format!("unknown tracker {:?}", track.id)));
            }
            Tween::new(
                0.0,
                track.target,
                track.duration.unwrap_or(beat.run_time),
                track.easing.unwrap_or(beat.easing),
            )?;
        }
        if let Some(theta) = beat.orbit {
            Tween::new(0.0, theta, beat.run_time, beat.easing)?;
        }
        let paths = beat
            .motions
            .iter()
            .map(|(path, _)| path)
            .chain(beat.updaters.iter().map(|(path, _)| path));
        for path in paths {
            if self.graph.node(path).is_none() {
                return Err(Error::Scene(format!("no node at {path:?}")));
            }
        }

        self.cancel_beat();
        let id = BeatId(self.next_beat);
        self.next_beat += 1;

        let Beat {
            run_time,
            easing,
            tracks,
            orbit,
            motions,
            updaters,
        } = beat;

        let mut tweens = Vec::with_capacity(tracks.len());
        for track in tracks {
            let tween = self.trackers.animate_to(
                track.id,
                track.target,
                track.duration.unwrap_or(run_time),
                track.easing.unwrap_or(easing),
            )?;
            tweens.push((track.id, tween));
        }
        let orbit = match orbit {
            Some(theta) => Some(self.orbit.animate_theta_to(theta, run_time, easing)?),
            None => None,
        };
        let animations = motions
            .into_iter()
            .filter_map(|(path, motion)| {
                let start = self.graph.node(&path)?.clone();
                let effect = match motion {
                    Motion::Shift(offset) => Effect::Shift(offset),
                    Motion::MoveTo(point) => {
                        let center = start
                            .center()
                            .unwrap_or_else(|| start.transform().translation());
                        Effect::Shift(point - center)
                    }
                    Motion::Recolor(color) => Effect::Recolor(color),
                    Motion::Fade(opacity) => Effect::Fade(opacity),
                };
                Some(NodeAnimation { path, effect, start })
            })
            .collect();
        for (path, callback) in updaters {
            self.updaters.register(path, Lifetime::Beat(id), callback);
        }

        debug!(
            "Playing beat {:?} for {}s ({} tweens, orbit: {})",
            id,
            duration,
            tweens.len(),
            orbit.is_some()
        );
        self.beat = Some(ActiveBeat {
            id,
            clock,
            progress,
            tweens,
            orbit,
            animations,
        });
        Ok(BeatHandle { id, handle })
    }

    /// Play an empty beat; standing updaters keep running.
    pub fn wait(&mut self, seconds: f32) -> Result<BeatHandle> {
        self.play(Beat::new(seconds))
    }

    /// Stop the running beat where it stands.
    ///
    /// Its tweens are cancelled unless a later call already replaced them,
    /// and its updaters are removed. Returns the cancelled beat.
    pub fn cancel_beat(&mut self) -> Option<BeatId> {
        let mut beat = self.beat.take()?;
        beat.clock.cancel();
        beat.progress.cancel();
        let retired = self.updaters.retire_beat(beat.id);

        for (id, handle) in &beat.tweens {
            if let Some(tracker) = self.trackers.get_mut(*id)
                && tracker.tween().is_some_and(|t| t.handle().same_as(handle))
            {
                tracker.cancel();
            }
        }
        if let Some(handle) = &beat.orbit
            && self.orbit.tween().is_some_and(|t| t.handle().same_as(handle))
        {
            self.orbit.cancel();
        }
        debug!("Cancelled beat {:?} ({} updaters retired)", beat.id, retired);
        Some(beat.id)
    }

    /// True when no beat, tracker tween or orbit is running.
    pub fn is_idle(&self) -> bool {
        self.beat.is_none() && !self.trackers.is_animating() && !self.orbit.is_animating()
    }

    /// Advance the session by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Result<FrameReport> {
        let snapshot = self.snapshot();
        match self.step(dt) {
            Ok(report) => Ok(report),
            Err(err) => {
                warn!(
                    "Frame {} failed, keeping frame {}: {}",
                    self.frame + 1,
                    self.frame,
                    err
                );
                self.rollback(snapshot);
                Err(err)
            }
        }
    }

    /// Tick `clock` and advance until the session is idle.
    ///
    /// Returns the number of frames run.
    pub fn run_to_idle(&mut self, clock: &mut FrameClock) -> Result<u64> {
        let mut frames = 0;
        while !self.is_idle() {
            let tick = clock.tick();
            self.advance(tick.dt)?;
            frames += 1;
        }
        Ok(frames)
    }

    /// Play `beat` and advance until the session is idle.
    pub fn play_and_wait(&mut self, beat: Beat, clock: &mut FrameClock) -> Result<BeatHandle> {
        let handle = self.play(beat)?;
        self.run_to_idle(clock)?;
        Ok(handle)
    }

    /// Wrap the stage for a renderer on another thread.
    ///
    /// Hold the lock for one `advance` and release it before reading back.
    pub fn into_shared(self) -> Arc<Mutex<Stage>> {
        Arc::new(Mutex::new(self))
    }

    fn snapshot(&self) -> Snapshot {
        let (beat, nodes) = match &self.beat {
            Some(beat) => (
                Some((beat.clock.clone(), beat.progress.clone())),
                beat.animations
                    .iter()
                    .filter_map(|a| Some((a.path.clone(), self.graph.node(&a.path)?.clone())))
                    .collect(),
            ),
            None => (None, Vec::new()),
        };
        Snapshot {
            trackers: self.trackers.clone(),
            orbit: self.orbit.clone(),
            beat,
            nodes,
        }
    }

    fn rollback(&mut self, snapshot: Snapshot) {
        let Snapshot {
            trackers,
            orbit,
            beat,
            nodes,
        } = snapshot;
        self.trackers.restore(trackers);
        self.orbit.restore(orbit);
        if let (Some(active), Some((clock, progress))) = (self.beat.as_mut(), beat) {
            active.clock.restore(clock);
            active.progress.restore(progress);
        }
        for (path, node) in nodes {
            if let Some(slot) = self.graph.node_mut(&path) {
                *slot = node;
            }
        }
    }

    fn step(&mut self, dt: f32) -> Result<FrameReport> {
        let mut completed = self.trackers.advance(dt);
        completed.extend(self.orbit.advance(dt));

        let mut beat_alpha = None;
        let mut beat_done = false;
        if let Some(beat) = self.beat.as_mut() {
            beat.progress.advance(dt);
            beat_done = beat.clock.advance(dt).is_some();
            let alpha = beat.progress.value();
            for animation in &beat.animations {
                if let Some(node) = self.graph.node_mut(&animation.path) {
                    animation.apply(node, alpha);
                }
            }
            beat_alpha = Some((beat.id, alpha));
        }

        let alpha = FrameAlpha {
            standing: 1.0,
            beat: beat_alpha,
        };
        let staged = self.updaters.stage(&self.graph, &self.trackers, alpha)?;
        let updated_targets = UpdaterRegistry::<NodePath, SceneNode>::commit(&mut self.graph, staged);
        self.frame += 1;

        let mut finished_beat = None;
        if beat_done && let Some(beat) = self.beat.take() {
            let retired = self.updaters.retire_beat(beat.id);
            debug!("Beat {:?} finished ({} updaters retired)", beat.id, retired);
            finished_beat = Some(beat.id);
        }
        trace!(
            "Frame {} committed ({} targets, {} tweens completed)",
            self.frame,
            updated_targets,
            completed.len()
        );

        Ok(FrameReport {
            frame: self.frame,
            beat: beat_alpha,
            completed,
            finished_beat,
            updated_targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramsurf_geometry::{Surface, UvGrid, generate};

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    fn square() -> SceneNode {
        let grid = UvGrid::new((-0.5, 0.5), (-0.5, 0.5), (2, 2)).unwrap();
        SceneNode::leaf(Surface::new(
            generate(|u, v| Vec3::new(u, v, 0.0), &grid),
            Color::GREY_B,
            1.0,
        ))
    }

    fn run(stage: &mut Stage, frames: usize, dt: f32) {
        for _ in 0..frames {
            stage.advance(dt).unwrap();
        }
    }

    #[test]
    fn test_beat_duration() {
        let mut trackers = Trackers::new();
        let id = trackers.add("x", 0.0);
        let beat = Beat::new(1.0)
            .track(id, 1.0)
            .track_with(id, 2.0, 3.5, Easing::Linear);
        assert_eq!(beat.duration(), 3.5);
        assert_eq!(Beat::new(2.0).duration(), 2.0);
    }

    #[test]
    fn test_tweens_in_a_beat_stay_in_lockstep() {
        let mut stage = Stage::new();
        let a = stage.trackers_mut().add("a", 0.0);
        let b = stage.trackers_mut().add("b", 10.0);
        stage
            .play(Beat::new(1.0).with_easing(Easing::Linear).track(a, 1.0).track(b, 20.0))
            .unwrap();

        run(&mut stage, 3, 0.25);
        assert!(approx_eq(stage.trackers().value(a).unwrap(), 0.75));
        assert!(approx_eq(stage.trackers().value(b).unwrap(), 17.5));
    }

    #[test]
    fn test_beat_completes() {
        let mut stage = Stage::new();
        let a = stage.trackers_mut().add("a", 0.0);
        let beat = stage.play(Beat::new(0.5).track(a, 2.0)).unwrap();

        let mut finished = None;
        for _ in 0..20 {
            let report = stage.advance(0.1).unwrap();
            if report.finished_beat.is_some() {
                finished = report.finished_beat;
                break;
            }
        }
        assert_eq!(finished, Some(beat.id()));
        assert!(beat.is_completed());
        assert_eq!(stage.trackers().value(a).unwrap(), 2.0);
        assert!(stage.is_idle());
    }

    #[test]
    fn test_new_beat_cancels_previous() {
        let mut stage = Stage::new();
        let a = stage.trackers_mut().add("a", 0.0);
        let b = stage.trackers_mut().add("b", 0.0);
        let first = stage
            .play(Beat::new(1.0).with_easing(Easing::Linear).track(a, 1.0).track(b, 1.0))
            .unwrap();
        run(&mut stage, 1, 0.5);

        let second = stage
            .play(Beat::new(1.0).with_easing(Easing::Linear).track(a, -1.0))
            .unwrap();
        assert_eq!(first.status(), TweenStatus::Cancelled);
        assert!(!stage.trackers().get(b).unwrap().is_animating());
        assert!(approx_eq(stage.trackers().value(b).unwrap(), 0.5));

        run(&mut stage, 2, 0.5);
        assert!(second.is_completed());
        assert_eq!(stage.trackers().value(a).unwrap(), -1.0);
    }

    #[test]
    fn test_play_validates_first() {
        let mut stage = Stage::new();
        let a = stage.trackers_mut().add("a", 0.0);
        let running = stage.play(Beat::new(1.0).track(a, 1.0)).unwrap();

        let err = stage.play(Beat::new(1.0).shift(NodePath::new([3]), Vec3::X));
        assert!(matches!(err, Err(Error::Scene(_))));
        let err = stage.play(Beat::new(-1.0));
        assert!(matches!(err, Err(Error::InvalidTween(_))));
        let err = stage.play(Beat::new(1.0).track(a, f32::NAN));
        assert!(matches!(err, Err(Error::InvalidTween(_))));

        assert_eq!(running.status(), TweenStatus::Running);
        assert!(stage.trackers().get(a).unwrap().is_animating());
    }

    #[test]
    fn test_node_animations_end_exactly() {
        let mut stage = Stage::new();
        let path = stage.graph_mut().add_to_root(square()).unwrap();
        stage
            .play(
                Beat::new(1.0)
                    .move_to(path.clone(), Vec3::new(3.0, -1.0, 2.0))
                    .recolor(path.clone(), Color::RED)
                    .fade(path.clone(), 0.5),
            )
            .unwrap();

        run(&mut stage, 7, 1.0 / 7.0);
        stage.advance(0.01).unwrap();
        let node = stage.graph().node(&path).unwrap();
        assert!(approx_eq_vec3(node.center().unwrap(), Vec3::new(3.0, -1.0, 2.0)));
        assert_eq!(node.surface().unwrap().color(), Some(Color::RED));
        assert_eq!(node.surface().unwrap().opacity(), 0.5);
    }

    #[test]
    fn test_beat_updater_gets_alpha_and_retires() {
        let mut stage = Stage::new();
        let path = stage.graph_mut().add_to_root(square()).unwrap();
        stage
            .play(
                Beat::new(1.0)
                    .with_easing(Easing::Linear)
                    .update_with(path.clone(), |node, _, alpha| {
                        node.set_opacity(1.0 - alpha);
                        Ok(())
                    }),
            )
            .unwrap();
        assert_eq!(stage.updater_count(), 1);

        run(&mut stage, 1, 0.25);
        let opacity = stage.graph().node(&path).unwrap().surface().unwrap().opacity();
        assert!(approx_eq(opacity, 0.75));

        run(&mut stage, 3, 0.25);
        stage.advance(0.01).unwrap();
        assert_eq!(stage.updater_count(), 0);
    }

    #[test]
    fn test_wait_runs_standing_updaters() {
        let mut stage = Stage::new();
        let path = stage.graph_mut().add_to_root(square()).unwrap();
        stage
            .add_updater(path.clone(), |node, _, alpha| {
                assert_eq!(alpha, 1.0);
                node.shift(Vec3::X);
                Ok(())
            })
            .unwrap();

        let handle = stage.wait(0.5).unwrap();
        let mut clock = FrameClock::new(10);
        let frames = stage.run_to_idle(&mut clock).unwrap();
        assert!(handle.is_completed());
        assert!(frames >= 5);

        let center = stage.graph().node(&path).unwrap().center().unwrap();
        assert!(approx_eq(center.x, frames as f32));
    }

    #[test]
    fn test_nested_updaters_compose() {
        let mut stage = Stage::new();
        let group = stage
            .graph_mut()
            .add_to_root(SceneNode::group([square(), square()]))
            .unwrap();
        let child = group.child(0);

        stage
            .add_updater(child.clone(), |node, _, _| {
                node.shift(Vec3::X);
                Ok(())
            })
            .unwrap();
        stage
            .add_updater(group.clone(), |node, _, _| {
                node.set_opacity(0.5);
                Ok(())
            })
            .unwrap();

        run(&mut stage, 3, 0.1);

        let node = stage.graph().node(&child).unwrap();
        assert!(approx_eq_vec3(node.center().unwrap(), Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(node.surface().unwrap().opacity(), 0.5);

        let sibling = stage.graph().node(&group.child(1)).unwrap();
        assert!(approx_eq_vec3(sibling.center().unwrap(), Vec3::ZERO));
    }

    #[test]
    fn test_group_updater_then_child_updater() {
        let mut stage = Stage::new();
        let group = stage
            .graph_mut()
            .add_to_root(SceneNode::group([square()]))
            .unwrap();
        let child = group.child(0);

        stage
            .add_updater(group.clone(), |node, _, _| {
                node.shift(Vec3::Y);
                Ok(())
            })
            .unwrap();
        stage
            .add_updater(child.clone(), |node, _, _| {
                node.shift(Vec3::X);
                Ok(())
            })
            .unwrap();

        let report = stage.advance(0.1).unwrap();
        assert_eq!(report.updated_targets, 2);
        let child_center = stage.graph().node(&child).unwrap().center().unwrap();
        assert!(approx_eq_vec3(child_center, Vec3::X));
        let group_center = stage.graph().node(&group).unwrap().center().unwrap();
        assert!(approx_eq_vec3(group_center, Vec3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_unknown_tracker_rolls_back_frame() {
        let mut foreign_trackers = Trackers::new();
        foreign_trackers.add("a", 0.0);
        let foreign = foreign_trackers.add("b", 0.0);

        let mut stage = Stage::new();
        let x = stage.trackers_mut().add("x", 0.0);
        let path = stage.graph_mut().add_to_root(square()).unwrap();
        stage
            .add_updater(path.clone(), move |node, trackers, _| {
                node.shift(Vec3::X * trackers.value(foreign)?);
                Ok(())
            })
            .unwrap();
        stage
            .play(Beat::new(1.0).with_easing(Easing::Linear).track(x, 1.0))
            .unwrap();

        let err = stage.advance(0.5);
        assert!(matches!(err, Err(Error::InvalidTween(_))));
        assert_eq!(stage.frame(), 0);
        assert_eq!(stage.trackers().value(x).unwrap(), 0.0);
        let center = stage.graph().node(&path).unwrap().center().unwrap();
        assert!(approx_eq_vec3(center, Vec3::ZERO));
    }

    #[test]
    fn test_add_updater_checks_path() {
        let mut stage = Stage::new();
        let err = stage.add_updater(NodePath::new([0]), |_, _, _| Ok(()));
        assert!(matches!(err, Err(Error::Scene(_))));
    }

    #[test]
    fn test_stage_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Stage>();

        let shared = Stage::new().into_shared();
        shared.lock().unwrap().advance(0.1).unwrap();
        assert_eq!(shared.lock().unwrap().frame(), 1);
    }
}
