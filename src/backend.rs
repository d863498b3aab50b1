//! The seam between the scene and whatever executes its draw calls.
//!
//! The scene never touches wgpu directly. It creates resources and issues draws
//! through [`RenderBackend`], and holds the returned handles. The wgpu
//! implementation lives in [`crate::renderer::WgpuBackend`]; tests drive the scene
//! with a recording backend instead.
//!
//! Handles are plain indices. They are only meaningful to the backend that
//! created them, and become invalid after [`RenderBackend::release`].

use glam::Mat4;
use image::RgbaImage;

use crate::bindings::UniformValue;
use crate::camera::CameraView;
use crate::error::SceneError;
use crate::geometry::MeshData;
use crate::light::DirectionalLight;
use crate::material::MaterialConfig;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// A mesh uploaded with [`RenderBackend::create_mesh`].
    MeshId
);
handle!(
    /// A texture uploaded with [`RenderBackend::create_texture`].
    TextureId
);
handle!(
    /// A material created with [`RenderBackend::create_material`].
    MaterialId
);
handle!(
    /// An offscreen render target created with [`RenderBackend::create_target`].
    TargetId
);

/// Any backend resource, for [`RenderBackend::release`] and error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    Mesh(MeshId),
    Texture(TextureId),
    Material(MaterialId),
    Target(TargetId),
}

impl From<MeshId> for Resource {
    fn from(id: MeshId) -> Self {
        Resource::Mesh(id)
    }
}

impl From<TextureId> for Resource {
    fn from(id: TextureId) -> Self {
        Resource::Texture(id)
    }
}

impl From<MaterialId> for Resource {
    fn from(id: MaterialId) -> Self {
        Resource::Material(id)
    }
}

impl From<TargetId> for Resource {
    fn from(id: TargetId) -> Self {
        Resource::Target(id)
    }
}

/// Rasterizer defaults applied to every pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterState {
    pub depth_test: bool,
    pub cull_back_faces: bool,
    pub wireframe: bool,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            depth_test: true,
            cull_back_faces: true,
            wireframe: false,
        }
    }
}

/// One mesh drawn with one material.
///
/// The camera travels with every call. `light` is only set for lit drawables.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall {
    pub mesh: MeshId,
    pub material: MaterialId,
    pub transform: Mat4,
    pub camera: CameraView,
    pub light: Option<DirectionalLight>,
}

impl DrawCall {
    /// A draw with an identity transform and a default camera, for screen-space
    /// meshes such as the post-effect canvas.
    pub fn screen(mesh: MeshId, material: MaterialId) -> Self {
        Self {
            mesh,
            material,
            transform: Mat4::IDENTITY,
            camera: CameraView::default(),
            light: None,
        }
    }
}

/// Everything the scene needs from a renderer.
///
/// Resource creation happens during scene init. Per frame the scene calls
/// [`begin_frame`](Self::begin_frame), then any number of target binds, clears and
/// draws, then [`end_frame`](Self::end_frame). Target binds must nest: a target has
/// to be unbound before another one is bound, and before the frame ends.
pub trait RenderBackend {
    /// Current size of the default target in pixels.
    fn viewport(&self) -> (u32, u32);

    /// Sets rasterizer defaults for materials created afterwards.
    fn set_raster_state(&mut self, state: RasterState);

    fn create_mesh(&mut self, label: &str, data: &MeshData) -> Result<MeshId, SceneError>;

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureId, SceneError>;

    /// Creates an offscreen target sized to the current viewport.
    fn create_target(&mut self, label: &str) -> Result<TargetId, SceneError>;

    fn create_material(&mut self, config: &MaterialConfig) -> Result<MaterialId, SceneError>;

    /// Updates one declared uniform of a material.
    fn set_uniform(
        &mut self,
        material: MaterialId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), SceneError>;

    /// Redirects subsequent clears and draws into `target`.
    fn bind_target(&mut self, target: TargetId) -> Result<(), SceneError>;

    /// Returns rendering to the default target.
    fn unbind_target(&mut self, target: TargetId) -> Result<(), SceneError>;

    /// Clears color and depth of the current target.
    fn clear(&mut self, color: [f32; 4]);

    /// Toggles depth testing for subsequent draws.
    fn set_depth_test(&mut self, enabled: bool);

    fn draw(&mut self, call: &DrawCall) -> Result<(), SceneError>;

    /// Frees a resource. Releasing twice, or releasing a handle this backend
    /// never issued, is an error.
    fn release(&mut self, resource: Resource) -> Result<(), SceneError>;

    fn begin_frame(&mut self);

    /// Submits everything recorded since [`begin_frame`](Self::begin_frame).
    fn end_frame(&mut self) -> Result<(), SceneError>;
}
