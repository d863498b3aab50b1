//! Scene configuration.
//!
//! [`SceneConfig::default`] reproduces the river scene: camera above the river
//! bank looking west, heightmap terrain, a flattened sky dome and a wide water
//! plane, composited through a sharpen effect. Override individual values with
//! the builder setters:
//!
//! ```
//! use tidewater::{PostEffect, SceneConfig};
//!
//! let config = SceneConfig::new()
//!     .effect(PostEffect::Grayscale)
//!     .wireframe(true);
//! assert_eq!(config.terrain_scale, 0.4);
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::{Vec3, Vec4};

use crate::assets::AssetSource;
use crate::light::DirectionalLight;

/// Full-screen effect applied when compositing the offscreen target.
///
/// The discriminant is the value the post-effect shader switches on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[repr(i32)]
pub enum PostEffect {
    /// Pass the scene through unchanged.
    Identity = 0,
    /// 5-tap sharpen kernel.
    #[default]
    Sharpen = 1,
    /// 5-tap box blur.
    Blur = 2,
    Grayscale = 3,
    Invert = 4,
}

impl PostEffect {
    pub fn shader_index(self) -> i32 {
        self as i32
    }
}

/// Everything the water scene needs before `init`.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    pub assets: AssetSource,
    pub effect: PostEffect,
    /// Draw every face as lines, when the adapter supports it.
    pub wireframe: bool,
    pub clear_color: [f32; 4],

    pub camera_position: Vec3,
    pub camera_yaw: f32,
    /// Vertical field of view in degrees.
    pub camera_fov: f32,
    /// Near and far clip distances.
    pub camera_clip: (f32, f32),

    pub light: DirectionalLight,

    /// Height units per heightmap luma step.
    pub terrain_scale: f32,
    /// How many times the terrain layer textures tile across the terrain.
    pub texture_repeat: i32,

    pub sky_slices: u32,
    pub sky_stacks: u32,
    pub sky_scale: Vec3,

    pub water_size: (f32, f32),
    pub water_height: f32,
    pub water_scale: Vec3,
    pub water_color: Vec4,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets: AssetSource::default(),
            effect: PostEffect::Sharpen,
            wireframe: false,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            camera_position: Vec3::new(145.0, 20.0, 0.0),
            camera_yaw: FRAC_PI_2,
            camera_fov: 45.0,
            camera_clip: (1.0, 20_000.0),
            light: DirectionalLight::new([1.0, -1.0, -1.0]).intensities(0.1, 1.0, 1.0),
            terrain_scale: 0.4,
            texture_repeat: 10,
            sky_slices: 10,
            sky_stacks: 10,
            sky_scale: Vec3::new(18_000.0, 1_000.0, 18_000.0),
            water_size: (400.0, 300.0),
            water_height: 11.0,
            water_scale: Vec3::new(100.0, 1.0, 100.0),
            water_color: Vec4::new(0.08, 0.32, 0.45, 0.65),
        }
    }
}

impl SceneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assets(mut self, assets: AssetSource) -> Self {
        self.assets = assets;
        self
    }

    pub fn effect(mut self, effect: PostEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the starting camera position and yaw (radians, 0 = facing -Z).
    pub fn camera(mut self, position: impl Into<Vec3>, yaw: f32) -> Self {
        self.camera_position = position.into();
        self.camera_yaw = yaw;
        self
    }

    pub fn clip_planes(mut self, near: f32, far: f32) -> Self {
        self.camera_clip = (near, far);
        self
    }

    pub fn light(mut self, light: DirectionalLight) -> Self {
        self.light = light;
        self
    }

    pub fn terrain_scale(mut self, scale: f32) -> Self {
        self.terrain_scale = scale;
        self
    }

    pub fn texture_repeat(mut self, repeat: i32) -> Self {
        self.texture_repeat = repeat;
        self
    }

    pub fn water_color(mut self, color: Vec4) -> Self {
        self.water_color = color;
        self
    }
}
