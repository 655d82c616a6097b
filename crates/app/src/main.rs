//! paramsurf - Wave Packet Demo
//!
//! Runs a two-Gaussian wave packet headless at the configured frame rate.
//! The outer bump first moves away from the origin, then circles it twice;
//! a standing updater rebuilds the surface and its colors every frame.

use std::f32::consts::PI;

use anyhow::{Context, Result};
use glam::Vec3;
use tracing::{debug, info};

use paramsurf_animation::{Easing, TrackerId, Trackers};
use paramsurf_core::{EngineConfig, Error, FrameClock};
use paramsurf_geometry::{Color, ColorMap, ScalarRange, Surface, UvGrid, generate};
use paramsurf_scene::{Beat, NodePath, OrbitCamera, OrbitController, PointLight, SceneNode, Stage};

const U_RANGE: (f32, f32) = (-5.0, 5.0);
const V_RANGE: (f32, f32) = (-5.0, 5.0);
const START_RADIUS: f32 = 0.1;
const TARGET_RADIUS: f32 = 3.0;

/// Center of the outer bump.
fn outer_center(radius: f32, angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (radius * cos, radius * sin)
}

/// Height field with one bump at the origin and one at `outer_center`.
fn wave_packet(radius: f32, angle: f32) -> impl Fn(f32, f32) -> Vec3 {
    let (cx, cy) = outer_center(radius, angle);
    move |u, v| {
        let inner = (-(u * u + v * v)).exp();
        let outer = (-((u - cx).powi(2) + (v - cy).powi(2))).exp();
        Vec3::new(u, v, inner + outer)
    }
}

/// Positive near the inner bump, negative near the outer one.
fn two_gaussian(radius: f32, angle: f32) -> impl Fn(Vec3) -> f32 {
    let (cx, cy) = outer_center(radius, angle);
    move |p| {
        let d1 = p.x * p.x + p.y * p.y;
        let d2 = (p.x - cx).powi(2) + (p.y - cy).powi(2);
        (-d1).exp() - (-d2).exp()
    }
}

struct App {
    stage: Stage,
    clock: FrameClock,
    frame_rate: u32,
    surface: NodePath,
    radius: TrackerId,
    angle: TrackerId,
}

impl App {
    fn new(config: &EngineConfig) -> Result<Self> {
        let camera = OrbitCamera {
            phi: 60f32.to_radians(),
            ..OrbitCamera::default()
        };
        let orbit = OrbitController::new(camera, PointLight::default());
        let mut stage = Stage::new().with_orbit(orbit);
        let radius = stage.trackers_mut().add("radius", START_RADIUS);
        let angle = stage.trackers_mut().add("angle", 0.0);

        let grid = UvGrid::new(U_RANGE, V_RANGE, config.resolution)?.with_epsilon(config.epsilon)?;
        let colormap = ColorMap::two_tone(Color::BLUE, Color::RED);
        let range = ScalarRange::new(-1.0, 1.0);

        let mesh = generate(wave_packet(START_RADIUS, 0.0), &grid);
        let mut surface = Surface::new(mesh, Color::BLUE, 1.0);
        surface.set_color_by_field(two_gaussian(START_RADIUS, 0.0), &colormap, range);
        info!(
            "Created {}x{} wave packet surface",
            config.resolution.0, config.resolution.1
        );

        let path = stage
            .graph_mut()
            .add_to_root(SceneNode::leaf(surface).with_name("wave_packet"))?;
        stage.add_updater(path.clone(), move |node, trackers: &Trackers, _| {
            let (r, a) = (trackers.value(radius)?, trackers.value(angle)?);
            let surface = node
                .surface_mut()
                .ok_or_else(|| Error::Scene("wave packet node is not a leaf".to_string()))?;
            surface.regenerate(wave_packet(r, a));
            surface.set_color_by_field(two_gaussian(r, a), &colormap, range);
            Ok(())
        })?;

        Ok(Self {
            stage,
            clock: FrameClock::new(config.frame_rate),
            frame_rate: config.frame_rate.max(1),
            surface: path,
            radius,
            angle,
        })
    }

    /// Play `beat` and run frames until the stage is idle.
    fn play(&mut self, label: &str, beat: Beat) -> Result<()> {
        info!("{} ({}s)", label, beat.duration());
        let handle = self
            .stage
            .play(beat)
            .with_context(|| format!("Failed to start '{label}'"))?;

        while !self.stage.is_idle() {
            let tick = self.clock.tick();
            let report = self
                .stage
                .advance(tick.dt)
                .with_context(|| format!("Frame {} of '{label}' failed", tick.frame))?;
            if report.frame % u64::from(self.frame_rate) == 0 {
                let trackers = self.stage.trackers();
                debug!(
                    "t={:.2}s radius={:.3} angle={:.3} beat alpha={:?}",
                    tick.time,
                    trackers.value(self.radius)?,
                    trackers.value(self.angle)?,
                    report.beat.map(|(_, alpha)| alpha)
                );
            }
        }

        info!("{} finished: {:?}", label, handle.status());
        Ok(())
    }

    fn log_surface(&self) {
        let items = self.stage.graph().render_items();
        let vertices: usize = items.iter().map(|item| item.vertices.len()).sum();
        let bytes: usize = items.iter().map(|item| item.vertex_bytes().len()).sum();
        let peak = self
            .stage
            .graph()
            .node(&self.surface)
            .and_then(SceneNode::surface)
            .and_then(|surface| surface.mesh().bounds())
            .map_or(0.0, |(_, hi)| hi.z);
        info!(
            "Surface: {} items, {} vertices ({} bytes), peak height {:.3}",
            items.len(),
            vertices,
            bytes,
            peak
        );
    }

    fn run(&mut self) -> Result<()> {
        self.log_surface();

        self.play(
            "Grow radius",
            Beat::new(2.0).track(self.radius, TARGET_RADIUS),
        )?;
        self.play(
            "Sweep angle",
            Beat::new(12.0)
                .with_easing(Easing::Linear)
                .track(self.angle, 4.0 * PI),
        )?;
        self.play("Wait", Beat::new(1.0))?;

        self.log_surface();
        info!(
            "Rendered {} frames ({:.1}s of animation) in {:.2?}",
            self.stage.frame(),
            self.clock.time(),
            self.clock.wall_elapsed()
        );
        Ok(())
    }
}

fn main() -> Result<()> {
    paramsurf_core::init_logging();
    info!("Starting paramsurf wave packet demo");

    let config = EngineConfig::from_env().context("Failed to load engine configuration")?;
    info!(
        "Frame rate {} fps, resolution {:?}, epsilon {}",
        config.frame_rate, config.resolution, config.epsilon
    );

    let mut app = App::new(&config)?;
    app.run()
}
