//! GPU attachments behind an offscreen render target.

/// Color and depth attachments sized to the viewport.
///
/// The color texture has both `RENDER_ATTACHMENT` and `TEXTURE_BINDING` usage, so
/// the scene renders into it and the compositor samples it afterwards.
pub(crate) struct OffscreenTarget {
    label: String,
    format: wgpu::TextureFormat,
    #[allow(dead_code)]
    color: wgpu::Texture,
    pub(crate) color_view: wgpu::TextureView,
    pub(crate) depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl OffscreenTarget {
    pub(crate) fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = create_depth_view(device, width, height, &format!("{label} Depth"));

        Self {
            label: label.to_string(),
            format,
            color,
            color_view,
            depth_view,
            width,
            height,
        }
    }

    /// Recreates both attachments if the viewport changed size.
    pub(crate) fn ensure_size(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width != width || self.height != height {
            log::debug!("Resizing target '{}' to {width}x{height}", self.label);
            let label = std::mem::take(&mut self.label);
            *self = Self::new(device, self.format, width, height, &label);
        }
    }
}

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) fn create_depth_view(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    label: &str,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
