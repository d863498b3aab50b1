//! GPU side of a material: shader, pipelines, uniform buffer and bind group layout.
//!
//! Every material pipeline uses two bind groups:
//! - **Group 0**: per-draw uniforms (matrices, camera position, light)
//! - **Group 1**: material uniforms at binding 0, a sampler at binding 1 and the
//!   material's textures from binding 2 on, in declaration order

use wgpu::util::DeviceExt;

use crate::backend::RasterState;
use crate::bindings::{UniformError, UniformValue};
use crate::material::{MaterialConfig, MaterialKind};
use crate::mesh::Vertex3d;
use crate::renderer::target::DEPTH_FORMAT;

fn shader_source(kind: MaterialKind) -> &'static str {
    match kind {
        MaterialKind::Phong => include_str!("../shaders/terrain.wgsl"),
        MaterialKind::Sky => include_str!("../shaders/sky.wgsl"),
        MaterialKind::Water => include_str!("../shaders/water.wgsl"),
        MaterialKind::PostFx => include_str!("../shaders/post_fx.wgsl"),
    }
}

pub(crate) struct GpuMaterial {
    pub(crate) config: MaterialConfig,
    uniform_buffer: wgpu::Buffer,
    layout: wgpu::BindGroupLayout,
    /// Depth tested and written.
    depth_pipeline: wgpu::RenderPipeline,
    /// Drawn over whatever is there, depth untouched.
    overlay_pipeline: wgpu::RenderPipeline,
}

impl GpuMaterial {
    pub(crate) fn new(
        device: &wgpu::Device,
        draw_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
        raster: RasterState,
        wireframe_supported: bool,
        config: &MaterialConfig,
    ) -> Self {
        let label = config.label.as_str();
        let kind = config.kind;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} Shader")),
            source: wgpu::ShaderSource::Wgsl(shader_source(kind).into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Material Uniforms")),
            contents: &config.uniforms.to_bytes(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let mut entries = vec![
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ];
        for slot in 0..kind.texture_slots() {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 2 + slot as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} Bind Group Layout")),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts: &[draw_layout, &layout],
            push_constant_ranges: &[],
        });

        let screen_space = kind == MaterialKind::PostFx;
        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: (raster.cull_back_faces && !screen_space).then_some(wgpu::Face::Back),
            polygon_mode: if raster.wireframe && wireframe_supported && !screen_space {
                wgpu::PolygonMode::Line
            } else {
                wgpu::PolygonMode::Fill
            },
            ..Default::default()
        };
        let blend = match kind {
            MaterialKind::Water => wgpu::BlendState::ALPHA_BLENDING,
            _ => wgpu::BlendState::REPLACE,
        };

        let pipeline = |depth_test: bool, suffix: &str| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{label} Pipeline ({suffix})")),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: color_format,
                        blend: Some(blend),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_test,
                    depth_compare: if depth_test {
                        wgpu::CompareFunction::Less
                    } else {
                        wgpu::CompareFunction::Always
                    },
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let depth_pipeline = pipeline(raster.depth_test, "depth");
        let overlay_pipeline = pipeline(false, "overlay");

        log::debug!("Created {} material '{label}'", kind.label());

        Self {
            config: config.clone(),
            uniform_buffer,
            layout,
            depth_pipeline,
            overlay_pipeline,
        }
    }

    pub(crate) fn pipeline(&self, depth_test: bool) -> &wgpu::RenderPipeline {
        if depth_test {
            &self.depth_pipeline
        } else {
            &self.overlay_pipeline
        }
    }

    /// Updates the CPU copy and uploads the whole block.
    pub(crate) fn set_uniform(
        &mut self,
        queue: &wgpu::Queue,
        name: &str,
        value: UniformValue,
    ) -> Result<(), UniformError> {
        self.config.uniforms.set(name, value)?;
        queue.write_buffer(&self.uniform_buffer, 0, &self.config.uniforms.to_bytes());
        Ok(())
    }

    /// Group 1 for this frame. `views` are the material's textures in order.
    pub(crate) fn bind_group(
        &self,
        device: &wgpu::Device,
        sampler: &wgpu::Sampler,
        views: &[&wgpu::TextureView],
    ) -> wgpu::BindGroup {
        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: self.uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ];
        for (slot, view) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 2 + slot as u32,
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", self.config.label)),
            layout: &self.layout,
            entries: &entries,
        })
    }
}
