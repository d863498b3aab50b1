//! # Tidewater
//!
//! **A river valley with a sky, animated water and a post-processing pass.**
//!
//! The scene is written against the [`RenderBackend`] trait: it creates meshes,
//! textures, materials and one offscreen target, then each frame renders the sky
//! dome, the lit terrain and the water into that target and composites it onto
//! the screen through a full-screen post-effect. [`WgpuBackend`] implements the
//! trait on top of wgpu.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tidewater::*;
//!
//! # fn demo(window: Arc<winit::window::Window>, input: &Input) -> Result<(), SceneError> {
//! let gpu = GpuContext::new(window, false)?;
//! let mut backend = WgpuBackend::new(gpu);
//!
//! let mut scene = WaterScene::new(SceneConfig::default().effect(PostEffect::Blur));
//! scene.init(&mut backend)?;
//! run_frame(&mut scene, &mut backend, 1.0 / 60.0, input)?;
//! scene.deinit(&mut backend)?;
//! # Ok(())
//! # }
//! ```
//!
//! Everything above the backend is plain data, so the scene also runs against
//! a recording backend in tests without a GPU.

mod animation;
mod assets;
mod backend;
mod bindings;
mod camera;
mod config;
mod controller;
mod error;
pub mod geometry;
mod gpu;
mod input;
mod lifecycle;
mod light;
pub mod material;
mod mesh;
mod render_target;
mod renderer;
mod scene_graph;
mod texture;
mod water_scene;

pub use animation::{CLOUD_SCROLL_RATE, CloudLayers, EffectOscillator};
pub use assets::{AssetSource, SceneAssets};
pub use backend::{
    DrawCall, MaterialId, MeshId, RasterState, RenderBackend, Resource, TargetId, TextureId,
};
pub use bindings::{
    TextureBinding, TextureSource, UniformBlock, UniformError, UniformKind, UniformValue,
};
pub use camera::{Camera, CameraView, PITCH_LIMIT};
pub use config::{PostEffect, SceneConfig};
pub use controller::CameraController;
pub use error::{SceneError, Severity};
pub use geometry::MeshData;
pub use gpu::GpuContext;
pub use input::{HeldKeys, Input, KeyBindings, KeyState, SceneKey};
pub use lifecycle::{Phase, Scene, report, run_frame};
pub use light::DirectionalLight;
pub use material::{MaterialConfig, MaterialKind, PhongParams};
pub use mesh::{Mesh, Vertex3d};
pub use render_target::{TargetBinding, TargetState};
pub use renderer::WgpuBackend;
pub use scene_graph::{Drawable, Layer, SceneGraph};
pub use texture::Texture;
pub use water_scene::WaterScene;

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
