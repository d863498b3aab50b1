//! Keyboard-driven camera motion.

use crate::camera::Camera;
use crate::input::{KeyState, SceneKey};

/// Turns held keys into camera motion, scaled by frame time.
///
/// Each opposing pair moves the camera at most one way per tick. When both keys
/// of a pair are held the first one listed wins:
///
/// | pair | motion |
/// |---|---|
/// | Forward / Back | along the view direction at `move_speed` |
/// | YawLeft / YawRight | yaw at `turn_speed` |
/// | Right / Left | along camera right at `move_speed` |
/// | Up / Down | pitch at `pitch_speed` |
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraController {
    /// Units per second.
    pub move_speed: f32,
    /// Radians per second.
    pub turn_speed: f32,
    /// Radians per second.
    pub pitch_speed: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            move_speed: 20.0,
            turn_speed: 1.0,
            pitch_speed: 1.0,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn turn_speed(mut self, speed: f32) -> Self {
        self.turn_speed = speed;
        self
    }

    pub fn update(&self, camera: &mut Camera, input: &dyn KeyState, dt: f32) {
        if input.is_down(SceneKey::Forward) {
            camera.move_forward(self.move_speed * dt);
        } else if input.is_down(SceneKey::Back) {
            camera.move_forward(-self.move_speed * dt);
        }

        if input.is_down(SceneKey::YawLeft) {
            camera.rotate_yaw(self.turn_speed * dt);
        } else if input.is_down(SceneKey::YawRight) {
            camera.rotate_yaw(-self.turn_speed * dt);
        }

        if input.is_down(SceneKey::Right) {
            camera.strafe_right(self.move_speed * dt);
        } else if input.is_down(SceneKey::Left) {
            camera.strafe_right(-self.move_speed * dt);
        }

        if input.is_down(SceneKey::Up) {
            camera.rotate_pitch(self.pitch_speed * dt);
        } else if input.is_down(SceneKey::Down) {
            camera.rotate_pitch(-self.pitch_speed * dt);
        }
    }
}
