use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use tidewater::{
    AssetSource, GpuContext, Input, PostEffect, Scene, SceneConfig, Severity, WaterScene,
    WgpuBackend, run_frame,
};

/// Fly over a river valley.
///
/// W/S move, A/D turn, arrow keys strafe and pitch, Escape quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Resource directory with Images/ and Textures/. Procedural assets when absent.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Post-effect applied when compositing.
    #[arg(long, value_enum, default_value_t = PostEffect::Sharpen)]
    effect: PostEffect,

    /// Draw faces as lines, if the adapter supports it.
    #[arg(long)]
    wireframe: bool,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Seed for procedural assets.
    #[arg(long, default_value_t = 7)]
    seed: u32,
}

impl Args {
    fn scene_config(&self) -> SceneConfig {
        let assets = match &self.assets {
            Some(dir) => AssetSource::Directory(dir.clone()),
            None => AssetSource::Procedural {
                seed: self.seed,
                size: 256,
            },
        };
        SceneConfig::new()
            .assets(assets)
            .effect(self.effect)
            .wireframe(self.wireframe)
    }
}

enum TidewaterApp {
    Pending {
        config: SceneConfig,
        width: u32,
        height: u32,
    },
    Running {
        window: Arc<Window>,
        backend: WgpuBackend,
        scene: WaterScene,
        input: Input,
        last_frame: Instant,
    },
    Failed(anyhow::Error),
    Closed,
}

impl TidewaterApp {
    fn start(
        event_loop: &ActiveEventLoop,
        config: SceneConfig,
        width: u32,
        height: u32,
    ) -> anyhow::Result<Self> {
        let attrs = WindowAttributes::default()
            .with_title("Tidewater")
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = GpuContext::new(window.clone(), config.wireframe)?;
        let mut backend = WgpuBackend::new(gpu);
        let mut scene = WaterScene::new(config);
        scene
            .init(&mut backend)
            .context("failed to initialize the scene")?;

        window.request_redraw();
        Ok(TidewaterApp::Running {
            window,
            backend,
            scene,
            input: Input::new(),
            last_frame: Instant::now(),
        })
    }

    fn shut_down(&mut self) {
        if let TidewaterApp::Running { scene, backend, .. } = self {
            if let Err(err) = scene.deinit(backend) {
                log::warn!("Scene shutdown incomplete: {err}");
            }
            *self = TidewaterApp::Closed;
        }
    }
}

impl ApplicationHandler for TidewaterApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let TidewaterApp::Pending {
            config,
            width,
            height,
        } = self
        {
            *self = match Self::start(event_loop, config.clone(), *width, *height) {
                Ok(app) => app,
                Err(err) => {
                    event_loop.exit();
                    TidewaterApp::Failed(err)
                }
            };
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let TidewaterApp::Running {
            window,
            backend,
            scene,
            input,
            last_frame,
        } = self
        else {
            return;
        };

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.shut_down();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                backend.resize(size.width, size.height);
                if let Err(err) = scene.resize(backend, size.width, size.height) {
                    log::error!("Resize failed: {err}");
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.duration_since(*last_frame).as_secs_f32();
                *last_frame = now;

                if let Err(err) = run_frame(scene, backend, dt, &*input) {
                    match err.severity() {
                        Severity::RecoverableFrame => log::warn!("Skipped frame: {err}"),
                        _ => {
                            log::error!("Frame failed: {err}");
                            let err = anyhow::Error::new(err);
                            self.shut_down();
                            *self = TidewaterApp::Failed(err);
                            event_loop.exit();
                            return;
                        }
                    }
                }
                window.request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shut_down();
    }
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::try_init();
    let args = Args::parse();
    log::info!("Starting with {:?} effect", args.effect);

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TidewaterApp::Pending {
        config: args.scene_config(),
        width: args.width,
        height: args.height,
    };
    event_loop.run_app(&mut app)?;

    match app {
        TidewaterApp::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

