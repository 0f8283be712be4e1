//! First-person fly camera.
//!
//! # Invariants
//! - `view` always reflects the transform as of the last `update` or
//!   `update_view_matrix` call.
//! - `projection` changes only through `update_projection_matrix`.
//! - The cached cursor is overwritten on every `update`, so a drag resumes from
//!   wherever the cursor was last seen, not from where the button was released.

use glam::{Mat4, Vec2, Vec3};
use prism_common::Transform;
use prism_input::{InputSnapshot, Key};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;

/// Cursor-to-radians factor applied on top of `look_speed * dt`.
const LOOK_SCALE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second.
    pub move_speed: f32,
    pub look_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_4,
            near: 0.01,
            far: 1000.0,
            move_speed: 5.0,
            look_speed: 50.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
    view: Mat4,
    projection: Mat4,
    settings: CameraSettings,
    last_cursor: Vec2,
    aspect: f32,
}

impl Camera {
    pub fn new(position: Vec3, aspect_ratio: f32) -> Self {
        Self::with_settings(position, aspect_ratio, CameraSettings::default())
    }

    pub fn with_settings(position: Vec3, aspect_ratio: f32, settings: CameraSettings) -> Self {
        let mut camera = Self {
            transform: Transform::from_position(position),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            settings,
            last_cursor: Vec2::ZERO,
            aspect: aspect_ratio,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix(aspect_ratio);
        camera
    }

    pub fn update_projection_matrix(&mut self, aspect_ratio: f32) {
        self.aspect = aspect_ratio;
        self.projection = Mat4::perspective_lh(
            self.settings.fov_y,
            aspect_ratio,
            self.settings.near,
            self.settings.far,
        );
    }

    pub fn update_view_matrix(&mut self) {
        let direction = self.transform.forward();
        self.view = Mat4::look_to_lh(self.transform.position(), direction, Vec3::Y);
    }

    /// Apply one frame of keyboard movement and mouse look.
    pub fn update(&mut self, dt: f32, input: &InputSnapshot) {
        let step = self.settings.move_speed * dt;

        if input.is_down(Key::W) {
            self.transform.move_relative(Vec3::Z * step);
        }
        if input.is_down(Key::S) {
            self.transform.move_relative(Vec3::NEG_Z * step);
        }
        if input.is_down(Key::D) {
            self.transform.move_relative(Vec3::X * step);
        }
        if input.is_down(Key::A) {
            self.transform.move_relative(Vec3::NEG_X * step);
        }
        if input.is_down(Key::Space) {
            self.transform.move_absolute(Vec3::Y * step);
        }
        if input.is_down(Key::X) {
            self.transform.move_absolute(Vec3::NEG_Y * step);
        }

        let cursor = input.cursor();
        if input.left_button() {
            let delta = (cursor - self.last_cursor) * self.settings.look_speed * dt * LOOK_SCALE;
            self.transform.rotate(Vec3::new(delta.y, delta.x, 0.0));
        }
        self.last_cursor = cursor;

        self.update_view_matrix();
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Direct access for scripted placement. Call
    /// [`Camera::update_view_matrix`] afterwards.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position()
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn projection_for_sixteen_by_nine() {
        let aspect = 16.0 / 9.0;
        let camera = Camera::new(Vec3::ZERO, aspect);
        let p = camera.projection_matrix();
        let h = 1.0 / (FRAC_PI_4 / 2.0).tan();
        assert!((p.col(1).y - h).abs() < 1e-5);
        assert!((p.col(0).x - h / aspect).abs() < 1e-5);
    }

    #[test]
    fn resize_recomputes_projection() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        let square = camera.projection_matrix();
        camera.update_projection_matrix(2.0);
        assert_ne!(square, camera.projection_matrix());
        assert_eq!(camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn view_places_origin_ahead() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, -5.0), 1.0);
        let p = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(p, Vec3::new(0.0, 0.0, 5.0)));
    }

    #[test]
    fn forward_key_moves_along_facing() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.update(1.0, &InputSnapshot::new().with_key(Key::W));
        assert!(approx(camera.position(), Vec3::new(0.0, 0.0, 5.0)));

        camera.transform_mut().set_rotation(Vec3::new(0.0, FRAC_PI_2, 0.0));
        camera.update(1.0, &InputSnapshot::new().with_key(Key::W));
        assert!(approx(camera.position(), Vec3::new(5.0, 0.0, 5.0)));
    }

    #[test]
    fn vertical_keys_ignore_pitch() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.transform_mut().set_rotation(Vec3::new(0.7, 0.0, 0.0));
        camera.update(0.5, &InputSnapshot::new().with_key(Key::Space));
        assert!(approx(camera.position(), Vec3::new(0.0, 2.5, 0.0)));
        camera.update(0.5, &InputSnapshot::new().with_key(Key::X));
        assert!(approx(camera.position(), Vec3::ZERO));
    }

    #[test]
    fn drag_rotates_pitch_and_yaw() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        camera.update(1.0, &InputSnapshot::new().with_cursor(10.0, 10.0));
        camera.update(
            1.0,
            &InputSnapshot::new()
                .with_cursor(12.0, 11.0)
                .with_left_button(true),
        );
        let r = camera.transform().pitch_yaw_roll();
        assert!((r.x - 0.5).abs() < 1e-5);
        assert!((r.y - 1.0).abs() < 1e-5);
        assert_eq!(r.z, 0.0);
    }

    #[test]
    fn cursor_cache_tracks_released_frames() {
        let mut camera = Camera::new(Vec3::ZERO, 1.0);
        let held = |x: f32| InputSnapshot::new().with_cursor(x, 0.0).with_left_button(true);

        camera.update(1.0, &held(0.0));
        // Cursor travels while the button is up; the cache follows it.
        camera.update(1.0, &InputSnapshot::new().with_cursor(100.0, 0.0));
        camera.update(1.0, &held(100.0));
        assert_eq!(camera.transform().pitch_yaw_roll(), Vec3::ZERO);
    }

    #[test]
    fn no_input_leaves_camera_still() {
        let mut camera = Camera::new(Vec3::new(1.0, 2.0, 3.0), 1.0);
        let before = camera.view_matrix();
        camera.update(0.016, &InputSnapshot::new());
        assert_eq!(camera.view_matrix(), before);
    }
}
