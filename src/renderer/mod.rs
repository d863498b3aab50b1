//! The wgpu implementation of [`RenderBackend`].
//!
//! Resource creation goes straight to the device. Frame commands are recorded
//! into a [`FrameRecord`](frame::FrameRecord) and encoded at
//! [`end_frame`](RenderBackend::end_frame), one render pass per target switch.
//! Every pass has a depth attachment: the screen's own depth buffer, or the
//! bound target's.

mod frame;
mod material;
mod target;

use std::collections::HashMap;

use image::RgbaImage;

use crate::backend::{
    DrawCall, MaterialId, MeshId, RasterState, RenderBackend, Resource, TargetId, TextureId,
};
use crate::bindings::{TextureSource, UniformValue};
use crate::error::SceneError;
use crate::geometry::MeshData;
use crate::gpu::GpuContext;
use crate::material::MaterialConfig;
use crate::mesh::Mesh;
use crate::render_target::TargetBinding;
use crate::texture::{self, Texture};

use frame::{DrawCmd, DrawUniforms, FrameRecord, PassRecord, PassTarget};
use material::GpuMaterial;
use target::{OffscreenTarget, create_depth_view};

/// Renders through a [`GpuContext`] onto its window surface.
pub struct WgpuBackend {
    gpu: GpuContext,
    raster: RasterState,
    depth_test: bool,
    next_id: u32,
    meshes: HashMap<MeshId, Mesh>,
    textures: HashMap<TextureId, Texture>,
    materials: HashMap<MaterialId, GpuMaterial>,
    targets: HashMap<TargetId, OffscreenTarget>,
    binding: TargetBinding,
    frame: FrameRecord,
    screen_depth: wgpu::TextureView,
    draw_layout: wgpu::BindGroupLayout,
    repeat_sampler: wgpu::Sampler,
    clamp_sampler: wgpu::Sampler,
}

impl WgpuBackend {
    pub fn new(gpu: GpuContext) -> Self {
        let device = &gpu.device;

        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let screen_depth = create_depth_view(device, gpu.width(), gpu.height(), "Screen Depth");
        let repeat_sampler = texture::repeat_sampler(device);
        let clamp_sampler = texture::clamp_sampler(device);

        Self {
            raster: RasterState::default(),
            depth_test: true,
            next_id: 0,
            meshes: HashMap::new(),
            textures: HashMap::new(),
            materials: HashMap::new(),
            targets: HashMap::new(),
            binding: TargetBinding::new(),
            frame: FrameRecord::default(),
            screen_depth,
            draw_layout,
            repeat_sampler,
            clamp_sampler,
            gpu,
        }
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Resizes the surface, the screen depth buffer and every offscreen target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.gpu.resize(width, height);
        self.screen_depth = create_depth_view(&self.gpu.device, width, height, "Screen Depth");
        for target in self.targets.values_mut() {
            target.ensure_size(&self.gpu.device, width, height);
        }
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn source_view(&self, source: TextureSource) -> Option<&wgpu::TextureView> {
        match source {
            TextureSource::Texture(id) => self.textures.get(&id).map(|t| &t.view),
            TextureSource::Target(id) => self.targets.get(&id).map(|t| &t.color_view),
        }
    }

    fn source_exists(&self, source: TextureSource) -> Result<(), SceneError> {
        match source {
            TextureSource::Texture(id) if !self.textures.contains_key(&id) => {
                Err(SceneError::UnknownResource(Resource::Texture(id)))
            }
            TextureSource::Target(id) if !self.targets.contains_key(&id) => {
                Err(SceneError::UnknownResource(Resource::Target(id)))
            }
            _ => Ok(()),
        }
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: &PassRecord,
        screen: &wgpu::TextureView,
    ) {
        let (color_view, depth_view) = match pass.target {
            PassTarget::Screen => (screen, &self.screen_depth),
            PassTarget::Offscreen(id) => match self.targets.get(&id) {
                Some(target) => (&target.color_view, &target.depth_view),
                None => {
                    log::warn!("Skipping pass into released target {}", id.raw());
                    return;
                }
            },
        };

        let (color_load, depth_load) = match pass.clear {
            Some([r, g, b, a]) => (
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                }),
                wgpu::LoadOp::Clear(1.0),
            ),
            None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(match pass.target {
                PassTarget::Screen => "Screen Pass",
                PassTarget::Offscreen(_) => "Offscreen Pass",
            }),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: color_load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: depth_load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        for cmd in &pass.draws {
            let (Some(mesh), Some(material)) =
                (self.meshes.get(&cmd.mesh), self.materials.get(&cmd.material))
            else {
                continue;
            };
            let views: Option<Vec<&wgpu::TextureView>> = material
                .config
                .sources()
                .map(|source| self.source_view(source))
                .collect();
            let Some(views) = views else {
                log::warn!("Skipping draw of '{}': a texture was released", material.config.label);
                continue;
            };
            let sampler = match material.config.kind {
                crate::material::MaterialKind::PostFx => &self.clamp_sampler,
                _ => &self.repeat_sampler,
            };

            let draw_buffer = wgpu::util::DeviceExt::create_buffer_init(
                &self.gpu.device,
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Draw Uniforms"),
                    contents: bytemuck::bytes_of(&cmd.uniforms),
                    usage: wgpu::BufferUsages::UNIFORM,
                },
            );
            let draw_group = self.gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Draw Bind Group"),
                layout: &self.draw_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: draw_buffer.as_entire_binding(),
                }],
            });
            let material_group = material.bind_group(&self.gpu.device, sampler, &views);

            render_pass.set_pipeline(material.pipeline(cmd.depth_test));
            render_pass.set_bind_group(0, &draw_group, &[]);
            render_pass.set_bind_group(1, &material_group, &[]);
            mesh.draw(&mut render_pass);
        }
    }
}

impl RenderBackend for WgpuBackend {
    fn viewport(&self) -> (u32, u32) {
        (self.gpu.width(), self.gpu.height())
    }

    fn set_raster_state(&mut self, state: RasterState) {
        if state.wireframe && !self.gpu.supports_wireframe() {
            log::warn!("Wireframe requested but the device has no line polygon mode");
        }
        self.raster = state;
        self.depth_test = state.depth_test;
    }

    fn create_mesh(&mut self, label: &str, data: &MeshData) -> Result<MeshId, SceneError> {
        data.validate()?;
        let id = MeshId::new(self.allocate());
        log::debug!(
            "Uploading mesh '{label}': {} vertices, {} triangles",
            data.vertices.len(),
            data.triangle_count()
        );
        self.meshes.insert(id, Mesh::new(&self.gpu.device, label, data));
        Ok(id)
    }

    fn create_texture(&mut self, label: &str, image: &RgbaImage) -> Result<TextureId, SceneError> {
        let id = TextureId::new(self.allocate());
        let texture = Texture::from_image(&self.gpu.device, &self.gpu.queue, image, label);
        log::debug!("Uploading texture '{label}': {}x{}", texture.width, texture.height);
        self.textures.insert(id, texture);
        Ok(id)
    }

    fn create_target(&mut self, label: &str) -> Result<TargetId, SceneError> {
        let id = TargetId::new(self.allocate());
        let (width, height) = self.viewport();
        log::debug!("Creating render target '{label}': {width}x{height}");
        let target = OffscreenTarget::new(
            &self.gpu.device,
            self.gpu.config.format,
            width,
            height,
            label,
        );
        self.targets.insert(id, target);
        Ok(id)
    }

    fn create_material(&mut self, config: &MaterialConfig) -> Result<MaterialId, SceneError> {
        let expected = config.kind.texture_slots();
        if config.textures.len() != expected {
            return Err(SceneError::MaterialLayout {
                label: config.label.clone(),
                expected,
                found: config.textures.len(),
            });
        }
        for source in config.sources() {
            self.source_exists(source)?;
        }

        let id = MaterialId::new(self.allocate());
        let material = GpuMaterial::new(
            &self.gpu.device,
            &self.draw_layout,
            self.gpu.config.format,
            self.raster,
            self.gpu.supports_wireframe(),
            config,
        );
        self.materials.insert(id, material);
        Ok(id)
    }

    fn set_uniform(
        &mut self,
        material: MaterialId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), SceneError> {
        let gpu_material = self
            .materials
            .get_mut(&material)
            .ok_or(SceneError::UnknownResource(Resource::Material(material)))?;
        gpu_material.set_uniform(&self.gpu.queue, name, value)?;
        Ok(())
    }

    fn bind_target(&mut self, target: TargetId) -> Result<(), SceneError> {
        if !self.targets.contains_key(&target) {
            return Err(SceneError::UnknownResource(Resource::Target(target)));
        }
        self.binding.bind(target)?;
        self.frame.switch_to(PassTarget::Offscreen(target));
        Ok(())
    }

    fn unbind_target(&mut self, target: TargetId) -> Result<(), SceneError> {
        self.binding.unbind(target)?;
        self.frame.switch_to(PassTarget::Screen);
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.frame.clear(color);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), SceneError> {
        if !self.meshes.contains_key(&call.mesh) {
            return Err(SceneError::UnknownResource(Resource::Mesh(call.mesh)));
        }
        if !self.materials.contains_key(&call.material) {
            return Err(SceneError::UnknownResource(Resource::Material(call.material)));
        }
        self.frame.push(DrawCmd {
            mesh: call.mesh,
            material: call.material,
            depth_test: self.depth_test,
            uniforms: DrawUniforms::from_call(call),
        });
        Ok(())
    }

    fn release(&mut self, resource: Resource) -> Result<(), SceneError> {
        let removed = match resource {
            Resource::Mesh(id) => self.meshes.remove(&id).is_some(),
            Resource::Texture(id) => self.textures.remove(&id).is_some(),
            Resource::Material(id) => self.materials.remove(&id).is_some(),
            Resource::Target(id) => self.targets.remove(&id).is_some(),
        };
        if removed {
            log::debug!("Released {resource:?}");
            Ok(())
        } else {
            Err(SceneError::UnknownResource(resource))
        }
    }

    fn begin_frame(&mut self) {
        self.frame.begin();
        self.depth_test = self.raster.depth_test;
    }

    fn end_frame(&mut self) -> Result<(), SceneError> {
        let passes = self.frame.take();
        self.binding.finish_frame()?;

        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.gpu.reconfigure();
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        let screen = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        for pass in &passes {
            self.encode_pass(&mut encoder, pass, &screen);
        }
        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
