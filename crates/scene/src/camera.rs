//! Orbit camera and the controller that keeps the light in step with it.

use glam::{Mat4, Vec3};
use paramsurf_animation::{Easing, Tracker, Tween, TweenHandle};
use paramsurf_core::Result;
use tracing::debug;

use crate::light::{PointLight, rotate_z};

/// A camera constrained to a sphere around a focal point.
///
/// `phi` is the polar angle from +z and `theta` the azimuth from +x, both in
/// radians.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub phi: f32,
    pub theta: f32,
    /// Distance from the focal point
    pub distance: f32,
    /// Point the camera looks at
    pub focal_point: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            phi: 0.0,
            theta: -std::f32::consts::FRAC_PI_2,
            distance: 20.0,
            focal_point: Vec3::ZERO,
        }
    }
}

impl OrbitCamera {
    /// Create a camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.focal_point
            + self.distance * Vec3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi)
    }

    /// Up direction, tangent to the sphere towards decreasing `phi`.
    ///
    /// Well defined at the poles, unlike a fixed world up.
    pub fn up(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(-cos_phi * cos_theta, -cos_phi * sin_theta, sin_phi)
    }

    /// Get the forward direction vector.
    pub fn forward(&self) -> Vec3 {
        (self.focal_point - self.position()).normalize_or_zero()
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.focal_point, self.up())
    }
}

/// An azimuth animation in flight.
#[derive(Clone, Debug)]
struct Orbit {
    start_theta: f32,
    delta: f32,
    light_start: Vec3,
}

/// Owns the session's camera and light and animates the camera azimuth.
///
/// While an orbit runs, the light is the light position captured when the
/// orbit started, rotated about world z by the same eased fraction of the
/// azimuth change as the camera. New orbits always start from the current
/// theta, so a sequence of partial rotations adds up to the total.
#[derive(Clone, Debug)]
pub struct OrbitController {
    camera: OrbitCamera,
    light: PointLight,
    theta: Tracker,
    orbit: Option<Orbit>,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(OrbitCamera::default(), PointLight::default())
    }
}

impl OrbitController {
    /// Create a controller from a camera and a light
    pub fn new(camera: OrbitCamera, light: PointLight) -> Self {
        let theta = Tracker::new(camera.theta);
        Self {
            camera,
            light,
            theta,
            orbit: None,
        }
    }

    /// Get the camera
    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    /// Get the light
    pub fn light(&self) -> &PointLight {
        &self.light
    }

    /// Authoritative azimuth; new orbits measure their delta from here.
    pub fn current_theta(&self) -> f32 {
        self.theta.value()
    }

    /// True while an orbit is running
    pub fn is_animating(&self) -> bool {
        self.orbit.is_some()
    }

    /// The running theta tween, if any.
    pub fn tween(&self) -> Option<&Tween> {
        self.theta.tween()
    }

    /// Set both angles immediately, stopping any orbit in flight.
    pub fn set_orientation(&mut self, phi: f32, theta: f32) {
        self.theta.set(theta);
        self.orbit = None;
        self.camera.phi = phi;
        self.camera.theta = theta;
    }

    /// Move the light. During an orbit the light keeps turning from here.
    pub fn set_light_position(&mut self, position: Vec3) {
        self.light.position = position;
        if let Some(orbit) = self.orbit.as_mut() {
            let turned = self.theta.value() - orbit.start_theta;
            orbit.light_start = rotate_z(position, -turned);
        }
    }

    /// Animate the azimuth to `target` over `duration` seconds.
    ///
    /// An orbit already in flight is cancelled where it stands.
    pub fn animate_theta_to(
        &mut self,
        target: f32,
        duration: f32,
        easing: Easing,
    ) -> Result<TweenHandle> {
        let start_theta = self.current_theta();
        let handle = self.theta.animate_to(target, duration, easing)?;
        debug!(
            "Orbit theta {:.4} -> {:.4} over {}s",
            start_theta, target, duration
        );
        self.orbit = Some(Orbit {
            start_theta,
            delta: target - start_theta,
            light_start: self.light.position,
        });
        Ok(handle)
    }

    /// Stop the orbit where it stands.
    pub fn cancel(&mut self) {
        self.theta.cancel();
        self.orbit = None;
    }

    /// Advance the orbit by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Option<TweenHandle> {
        let completed = self.theta.advance(dt);
        self.sync();
        completed
    }

    /// Drive the orbit with an external alpha.
    pub fn apply_alpha(&mut self, alpha: f32) -> Option<TweenHandle> {
        let completed = self.theta.apply_alpha(alpha);
        self.sync();
        completed
    }

    fn sync(&mut self) {
        self.camera.theta = self.theta.value();
        let Some(orbit) = &self.orbit else {
            return;
        };
        match self.theta.tween() {
            Some(tween) => {
                let angle = tween.eased_alpha() * orbit.delta;
                self.light.position = rotate_z(orbit.light_start, angle);
            }
            None => {
                self.light.position = rotate_z(orbit.light_start, orbit.delta);
                self.orbit = None;
            }
        }
    }

    /// Roll back to `snapshot`, an earlier clone of this controller.
    pub fn restore(&mut self, snapshot: OrbitController) {
        let OrbitController {
            camera,
            light,
            theta,
            orbit,
        } = snapshot;
        self.theta.restore(theta);
        self.camera = camera;
        self.light = light;
        self.orbit = orbit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramsurf_animation::TweenStatus;
    use std::f32::consts::{FRAC_PI_2, PI, TAU};

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn approx_eq_vec3(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    fn controller(theta: f32) -> OrbitController {
        let light = PointLight::at(Vec3::new(0.0, -4.0, 5.0));
        let mut c = OrbitController::new(OrbitCamera::new(), light);
        c.set_orientation(75f32.to_radians(), theta);
        c
    }

    fn run(c: &mut OrbitController, duration: f32, frames: usize) {
        for _ in 0..frames {
            c.advance(duration / frames as f32);
        }
        c.advance(1e-3);
    }

    #[test]
    fn test_camera_position() {
        let camera = OrbitCamera {
            phi: FRAC_PI_2,
            theta: 0.0,
            distance: 2.0,
            focal_point: Vec3::ZERO,
        };
        assert!(approx_eq_vec3(camera.position(), Vec3::new(2.0, 0.0, 0.0)));
        assert!(approx_eq_vec3(camera.up(), Vec3::Z));
        assert!(approx_eq_vec3(camera.forward(), Vec3::NEG_X));
    }

    #[test]
    fn test_camera_up_at_pole() {
        let camera = OrbitCamera::new();
        let up = camera.up();
        assert!(approx_eq(up.length(), 1.0));
        assert!(approx_eq(up.dot(camera.forward()), 0.0));
    }

    #[test]
    fn test_set_orientation_is_immediate() {
        let mut c = controller(0.0);
        c.set_orientation(0.5, 1.25);
        assert_eq!(c.current_theta(), 1.25);
        assert_eq!(c.camera().phi, 0.5);
        assert_eq!(c.camera().theta, 1.25);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_light_follows_eased_alpha() {
        let mut c = controller(0.0);
        let light_start = c.light().position;
        c.animate_theta_to(FRAC_PI_2, 1.0, Easing::Smooth).unwrap();

        c.advance(0.25);
        let expected = rotate_z(light_start, Easing::Smooth.apply(0.25) * FRAC_PI_2);
        assert!(approx_eq_vec3(c.light().position, expected));
        assert!(approx_eq(
            c.current_theta(),
            Easing::Smooth.apply(0.25) * FRAC_PI_2
        ));
    }

    #[test]
    fn test_orbit_ends_exactly() {
        let mut c = controller(0.3);
        let light_start = c.light().position;
        let handle = c.animate_theta_to(1.9, 0.8, Easing::Smooth).unwrap();
        run(&mut c, 0.8, 48);

        assert!(handle.is_completed());
        assert_eq!(c.current_theta(), 1.9);
        assert_eq!(c.camera().theta, 1.9);
        assert!(approx_eq_vec3(c.light().position, rotate_z(light_start, 1.6)));
        assert!(!c.is_animating());
    }

    #[test]
    fn test_orbits_compose() {
        let start = 0.2;
        let (t1, t2) = (1.4, -0.9);

        let mut stepped = controller(start);
        let light_start = stepped.light().position;
        stepped.animate_theta_to(t1, 0.8, Easing::Smooth).unwrap();
        run(&mut stepped, 0.8, 30);
        stepped.animate_theta_to(t2, 0.8, Easing::Smooth).unwrap();
        run(&mut stepped, 0.8, 30);

        let mut direct = controller(start);
        direct.animate_theta_to(t2, 1.0, Easing::Linear).unwrap();
        run(&mut direct, 1.0, 10);

        assert!(approx_eq(stepped.current_theta(), direct.current_theta()));
        assert!(approx_eq_vec3(stepped.light().position, direct.light().position));
        assert!(approx_eq_vec3(
            stepped.light().position,
            rotate_z(light_start, t2 - start)
        ));
    }

    #[test]
    fn test_full_turn_returns_light() {
        let mut c = controller(0.0);
        let light_start = c.light().position;
        c.animate_theta_to(TAU, 5.0, Easing::Smooth).unwrap();
        run(&mut c, 5.0, 300);
        assert!(approx_eq_vec3(c.light().position, light_start));
    }

    #[test]
    fn test_interrupted_orbit_uses_committed_theta() {
        let mut c = controller(0.0);
        let light_start = c.light().position;
        let first = c.animate_theta_to(PI, 1.0, Easing::Linear).unwrap();
        c.advance(0.5);
        let halfway = c.current_theta();
        assert!(approx_eq(halfway, FRAC_PI_2));

        c.animate_theta_to(0.0, 1.0, Easing::Linear).unwrap();
        assert_eq!(first.status(), TweenStatus::Cancelled);
        run(&mut c, 1.0, 4);

        assert!(approx_eq(c.current_theta(), 0.0));
        assert!(approx_eq_vec3(c.light().position, light_start));
    }

    #[test]
    fn test_set_light_mid_orbit_keeps_turning() {
        let mut c = controller(0.0);
        c.animate_theta_to(FRAC_PI_2, 1.0, Easing::Linear).unwrap();
        c.advance(0.5);
        c.set_light_position(Vec3::new(1.0, 0.0, 0.0));
        run(&mut c, 0.5, 2);

        let expected = rotate_z(Vec3::new(1.0, 0.0, 0.0), FRAC_PI_2 / 2.0);
        assert!(approx_eq_vec3(c.light().position, expected));
    }

    #[test]
    fn test_restore_rolls_back() {
        let mut c = controller(0.0);
        let handle = c.animate_theta_to(1.0, 1.0, Easing::Linear).unwrap();
        let snapshot = c.clone();
        c.advance(2.0);
        assert!(handle.is_completed());

        c.restore(snapshot);
        assert_eq!(c.current_theta(), 0.0);
        assert!(c.is_animating());
        assert_eq!(handle.status(), TweenStatus::Running);
    }
}
