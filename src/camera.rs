//! A yaw/pitch perspective camera.
//!
//! Orientation is stored as two angles. Yaw 0 looks toward -Z and positive yaw
//! turns left (counter-clockwise seen from above); pitch 0 is level and positive
//! pitch looks up.
//!
//! # Example
//!
//! ```
//! use tidewater::{Camera, Vec3};
//!
//! let mut camera = Camera::new()
//!     .at(Vec3::new(145.0, 20.0, 0.0))
//!     .yaw(std::f32::consts::FRAC_PI_2);
//!
//! // Facing -X, so moving forward decreases x.
//! camera.move_forward(10.0);
//! assert!((camera.position.x - 135.0).abs() < 1e-4);
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

/// Pitch never reaches straight up or down, which would collapse the view basis.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// A perspective camera driven by position, yaw and pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Radians. 0 = looking toward -Z, positive turns left.
    pub yaw: f32,
    /// Radians, clamped to ±[`PITCH_LIMIT`].
    pub pitch: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            fov: 45f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 1.0,
            far: 20_000.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: impl Into<Vec3>) -> Self {
        self.position = position.into();
        self
    }

    pub fn yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self
    }

    /// Set the vertical field of view in degrees.
    pub fn fov(mut self, fov_degrees: f32) -> Self {
        self.fov = fov_degrees.to_radians();
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }

    /// Ignores non-positive aspect ratios, which happen while a window is minimized.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            -self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Unit strafe direction, always horizontal.
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    pub fn strafe_right(&mut self, distance: f32) {
        self.position += self.right() * distance;
    }

    /// Positive angles turn left.
    pub fn rotate_yaw(&mut self, angle: f32) {
        self.yaw += angle;
    }

    /// Positive angles look up. The result is clamped.
    pub fn rotate_pitch(&mut self, angle: f32) {
        self.pitch = (self.pitch + angle).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Snapshot of the matrices a draw call needs.
    pub fn view(&self) -> CameraView {
        CameraView {
            view: self.view_matrix(),
            projection: self.projection_matrix(),
            position: self.position,
        }
    }
}

/// Camera matrices captured at draw time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}
