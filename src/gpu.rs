//! The window surface and the device behind it.
//!
//! [`WgpuBackend`](crate::WgpuBackend) takes ownership of a [`GpuContext`] and
//! creates every GPU resource through its device.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tidewater::GpuContext;
//!
//! # fn demo(window: Arc<winit::window::Window>) -> Result<(), tidewater::SceneError> {
//! let mut gpu = GpuContext::new(window, false)?;
//!
//! gpu.resize(1280, 720);
//! assert_eq!((gpu.width(), gpu.height()), (1280, 720));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use winit::window::Window;

use crate::error::SceneError;

/// Device, queue and the configured window surface.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Size and format of the surface. Offscreen targets copy both.
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Picks an adapter for `window` and configures an sRGB, vsynced surface.
    ///
    /// Any failure along the way is fatal for the scene. With `wireframe` set,
    /// line polygon mode is requested when the adapter offers it. Without it,
    /// wireframe rendering is quietly unavailable.
    pub fn new(window: Arc<Window>, wireframe: bool) -> Result<Self, SceneError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);

        let mut required_features = wgpu::Features::empty();
        if wireframe {
            if adapter.features().contains(wgpu::Features::POLYGON_MODE_LINE) {
                required_features |= wgpu::Features::POLYGON_MODE_LINE;
            } else {
                log::warn!("Adapter does not support line polygon mode; wireframe disabled");
            }
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Tidewater Device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Zero sizes (a minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapplies the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// True when pipelines may use line polygon mode.
    pub fn supports_wireframe(&self) -> bool {
        self.device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }
}
