//! The river scene: terrain, sky dome and water rendered offscreen, then
//! composited onto the screen through a post-effect.
//!
//! Each frame, [`WaterScene::draw`]
//!
//! 1. binds the offscreen target and clears it,
//! 2. draws the sky dome with depth testing off, then the lit terrain, then the
//!    water,
//! 3. unbinds the target, clears the default target and draws a full-screen
//!    canvas whose material samples the offscreen color attachment.
//!
//! # Example
//!
//! ```ignore
//! let mut scene = WaterScene::new(SceneConfig::default());
//! scene.init(&mut backend)?;
//! loop {
//!     run_frame(&mut scene, &mut backend, dt, &input)?;
//! }
//! scene.deinit(&mut backend)?;
//! ```

use image::RgbaImage;

use crate::animation::{CloudLayers, EffectOscillator};
use crate::assets::SceneAssets;
use crate::backend::{
    DrawCall, MaterialId, MeshId, RasterState, RenderBackend, Resource, TargetId,
};
use crate::bindings::{TextureSource, UniformValue};
use crate::camera::Camera;
use crate::config::SceneConfig;
use crate::controller::CameraController;
use crate::error::SceneError;
use crate::geometry;
use crate::input::KeyState;
use crate::lifecycle::{Phase, Scene, report};
use crate::light::DirectionalLight;
use crate::material::{self, MaterialConfig, PhongParams};
use crate::scene_graph::{Drawable, Layer, SceneGraph};

/// Handles created by `init`, released by `deinit`.
#[derive(Debug)]
struct SceneResources {
    graph: SceneGraph,
    sky_material: MaterialId,
    water_material: MaterialId,
    canvas: MeshId,
    post_fx: MaterialId,
    target: TargetId,
    /// Every handle above and every texture, in creation order.
    owned: Vec<Resource>,
}

/// Collects handles as they are created so a failed `init` can release them.
struct Allocations<'a, B: RenderBackend> {
    backend: &'a mut B,
    owned: Vec<Resource>,
}

impl<'a, B: RenderBackend> Allocations<'a, B> {
    fn track<T: Copy + Into<Resource>>(&mut self, handle: T) -> T {
        self.owned.push(handle.into());
        handle
    }

    fn rollback(self) {
        for resource in self.owned.into_iter().rev() {
            if let Err(err) = self.backend.release(resource) {
                log::warn!("Failed to release {resource:?} after a failed init: {err}");
            }
        }
    }
}

/// The water scene.
pub struct WaterScene {
    config: SceneConfig,
    phase: Phase,
    camera: Camera,
    controller: CameraController,
    light: DirectionalLight,
    clouds: CloudLayers,
    effect: EffectOscillator,
    water_time: f32,
    resources: Option<SceneResources>,
}

impl WaterScene {
    pub fn new(config: SceneConfig) -> Self {
        let camera = Camera::new()
            .at(config.camera_position)
            .yaw(config.camera_yaw)
            .fov(config.camera_fov)
            .clip_planes(config.camera_clip.0, config.camera_clip.1);
        Self {
            light: config.light,
            config,
            phase: Phase::Uninitialized,
            camera,
            controller: CameraController::new(),
            clouds: CloudLayers::new(),
            effect: EffectOscillator::new(),
            water_time: 0.0,
            resources: None,
        }
    }

    /// Where the scene is in its lifecycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn light(&self) -> DirectionalLight {
        self.light
    }

    pub fn clouds(&self) -> CloudLayers {
        self.clouds
    }

    /// Current post-effect strength. May overshoot `[0, 1]` by one tick.
    pub fn effect_percent(&self) -> f32 {
        self.effect.percent()
    }

    pub fn water_time(&self) -> f32 {
        self.water_time
    }

    /// The offscreen target, while the scene is initialized.
    pub fn target(&self) -> Option<TargetId> {
        self.resources.as_ref().map(|r| r.target)
    }

    pub fn graph(&self) -> Option<&SceneGraph> {
        self.resources.as_ref().map(|r| &r.graph)
    }

    /// The compositor's canvas mesh and post-effect material.
    pub fn compositor(&self) -> Option<(MeshId, MaterialId)> {
        self.resources.as_ref().map(|r| (r.canvas, r.post_fx))
    }

    fn live_resources(&self, op: &'static str) -> Result<&SceneResources, SceneError> {
        self.resources.as_ref().ok_or_else(|| {
            report(SceneError::Lifecycle {
                op,
                phase: self.phase,
            })
        })
    }

    fn create_resources<B: RenderBackend>(
        &self,
        assets: &SceneAssets,
        alloc: &mut Allocations<'_, B>,
    ) -> Result<SceneResources, SceneError> {
        let config = &self.config;

        let terrain_data =
            geometry::terrain_from_heightmap(&assets.heightmap, config.terrain_scale)?;
        let terrain_mesh = alloc.backend.create_mesh("terrain", &terrain_data)?;
        let terrain_mesh = alloc.track(terrain_mesh);

        let sky_data = geometry::skydome(config.sky_slices, config.sky_stacks, 1.0);
        let sky_mesh = alloc.backend.create_mesh("skydome", &sky_data)?;
        let sky_mesh = alloc.track(sky_mesh);

        let (water_w, water_d) = config.water_size;
        let water_data = geometry::xz_square(water_w, water_d, config.water_height);
        let water_mesh = alloc.backend.create_mesh("water", &water_data)?;
        let water_mesh = alloc.track(water_mesh);

        let canvas = alloc.backend.create_mesh("canvas", &geometry::canvas())?;
        let canvas = alloc.track(canvas);

        let mut texture = |label: &str, image: &RgbaImage| -> Result<TextureSource, SceneError> {
            let id = alloc.backend.create_texture(label, image)?;
            Ok(TextureSource::Texture(alloc.track(id)))
        };
        let snow = texture("snow", &assets.snow)?;
        let rock = texture("rock", &assets.rock)?;
        let grass = texture("grass", &assets.grass)?;
        let sand = texture("sand", &assets.sand)?;
        let blend_map = texture("blend map", &assets.blend_map)?;
        let cloud1 = texture("cloud1", &assets.cloud1)?;
        let cloud2 = texture("cloud2", &assets.cloud2)?;

        let terrain_material = MaterialConfig::phong(
            "terrain",
            PhongParams::default(),
            config.texture_repeat,
        )
        .texture("u_tex_snow", snow)
        .texture("u_tex_rock", rock)
        .texture("u_tex_grass", grass)
        .texture("u_tex_sand", sand)
        .texture("u_blend_map", blend_map);
        let terrain_material = alloc.backend.create_material(&terrain_material)?;
        let terrain_material = alloc.track(terrain_material);

        let sky_material = MaterialConfig::sky(
            "sky",
            cloud1,
            cloud2,
            self.clouds.first,
            self.clouds.second,
        );
        let sky_material = alloc.backend.create_material(&sky_material)?;
        let sky_material = alloc.track(sky_material);

        let water_material = MaterialConfig::water("water", config.water_color);
        let water_material = alloc.backend.create_material(&water_material)?;
        let water_material = alloc.track(water_material);

        let target = alloc.backend.create_target("scene target")?;
        let target = alloc.track(target);

        let (width, height) = alloc.backend.viewport();
        let post_fx = MaterialConfig::post_fx(
            "post_fx",
            config.effect,
            TextureSource::Target(target),
            MaterialConfig::texel_for(width, height),
        );
        let post_fx = alloc.backend.create_material(&post_fx)?;
        let post_fx = alloc.track(post_fx);

        let mut graph = SceneGraph::new();
        graph.insert(
            Layer::Sky,
            Drawable::new(sky_mesh, sky_material)
                .scaled(config.sky_scale)
                .depth_test(false),
        );
        graph.insert(
            Layer::Terrain,
            Drawable::new(terrain_mesh, terrain_material).lit(),
        );
        graph.insert(
            Layer::Water,
            Drawable::new(water_mesh, water_material).scaled(config.water_scale),
        );

        Ok(SceneResources {
            graph,
            sky_material,
            water_material,
            canvas,
            post_fx,
            target,
            owned: std::mem::take(&mut alloc.owned),
        })
    }

    /// Draws the scene graph into whatever target is bound.
    fn compose<B: RenderBackend>(
        &self,
        backend: &mut B,
        graph: &SceneGraph,
    ) -> Result<(), SceneError> {
        let view = self.camera.view();
        for (_, drawable) in graph.iter() {
            let call = DrawCall {
                mesh: drawable.mesh,
                material: drawable.material,
                transform: drawable.transform,
                camera: view,
                light: drawable.lit.then_some(self.light),
            };
            if drawable.depth_test {
                backend.draw(&call)?;
            } else {
                backend.set_depth_test(false);
                let drawn = backend.draw(&call);
                backend.set_depth_test(true);
                drawn?;
            }
        }
        Ok(())
    }
}

impl<B: RenderBackend> Scene<B> for WaterScene {
    fn init(&mut self, backend: &mut B) -> Result<(), SceneError> {
        let next = self.phase.after_init().map_err(report)?;
        log::info!("Initializing water scene");

        let assets = SceneAssets::load(&self.config.assets)?;

        backend.set_raster_state(RasterState {
            depth_test: true,
            cull_back_faces: true,
            wireframe: self.config.wireframe,
        });

        let (width, height) = backend.viewport();
        self.camera.set_aspect(width as f32 / height.max(1) as f32);

        let mut alloc = Allocations {
            backend,
            owned: Vec::new(),
        };
        let resources = match self.create_resources(&assets, &mut alloc) {
            Ok(resources) => resources,
            Err(err) => {
                alloc.rollback();
                return Err(report(err));
            }
        };

        log::info!(
            "Water scene ready: {} drawables, {} resources",
            resources.graph.len(),
            resources.owned.len()
        );
        self.resources = Some(resources);
        self.phase = next;
        Ok(())
    }

    fn update(
        &mut self,
        backend: &mut B,
        dt: f32,
        input: &dyn KeyState,
    ) -> Result<(), SceneError> {
        let next = self.phase.after_update().map_err(report)?;

        // State is committed only after every uniform is accepted.
        let mut camera = self.camera;
        self.controller.update(&mut camera, input, dt);
        let mut clouds = self.clouds;
        clouds.advance(dt);
        let mut effect = self.effect;
        effect.advance(dt);
        let water_time = self.water_time + dt;

        let res = self.live_resources("update")?;
        let uniforms = [
            (
                res.sky_material,
                material::U_TEX_OFFSET1,
                UniformValue::Vec2(clouds.first),
            ),
            (
                res.sky_material,
                material::U_TEX_OFFSET2,
                UniformValue::Vec2(clouds.second),
            ),
            (
                res.water_material,
                material::U_TIME,
                UniformValue::Float(water_time),
            ),
            (
                res.post_fx,
                material::U_PERCENT,
                UniformValue::Float(effect.percent()),
            ),
        ];
        for (material, name, value) in uniforms {
            backend.set_uniform(material, name, value).map_err(report)?;
        }

        self.camera = camera;
        self.clouds = clouds;
        self.effect = effect;
        self.water_time = water_time;
        self.phase = next;
        Ok(())
    }

    fn draw(&mut self, backend: &mut B) -> Result<(), SceneError> {
        let next = self.phase.after_draw().map_err(report)?;
        let res = self.live_resources("draw")?;
        let clear = self.config.clear_color;

        backend.bind_target(res.target).map_err(report)?;
        backend.clear(clear);
        let composed = self.compose(backend, &res.graph);
        let unbound = backend.unbind_target(res.target);
        composed.map_err(report)?;
        unbound.map_err(report)?;

        backend.clear(clear);
        backend.set_depth_test(false);
        let drawn = backend.draw(&DrawCall::screen(res.canvas, res.post_fx));
        backend.set_depth_test(true);
        drawn.map_err(report)?;

        self.phase = next;
        Ok(())
    }

    fn deinit(&mut self, backend: &mut B) -> Result<(), SceneError> {
        let Some(next) = self.phase.after_deinit() else {
            return Ok(());
        };
        self.phase = next;

        let Some(resources) = self.resources.take() else {
            return Ok(());
        };
        let mut first_error = None;
        for resource in resources.owned.into_iter().rev() {
            if let Err(err) = backend.release(resource) {
                log::warn!("Failed to release {resource:?}: {err}");
                first_error.get_or_insert(err);
            }
        }
        log::info!("Water scene deinitialized");
        match first_error {
            Some(err) => Err(report(err)),
            None => Ok(()),
        }
    }

    fn resize(&mut self, backend: &mut B, width: u32, height: u32) -> Result<(), SceneError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.camera.set_aspect(width as f32 / height as f32);
        if let Some(res) = &self.resources {
            backend
                .set_uniform(
                    res.post_fx,
                    material::U_TEXEL,
                    UniformValue::Vec2(MaterialConfig::texel_for(width, height)),
                )
                .map_err(report)?;
        }
        Ok(())
    }

}

impl Default for WaterScene {
    fn default() -> Self {
        Self::new(SceneConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_uses_the_configured_camera() {
        let config = SceneConfig::new().camera([1.0, 2.0, 3.0], 0.5);
        let scene = WaterScene::new(config);
        assert_eq!(scene.camera().position, glam::Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.camera().yaw, 0.5);
        assert_eq!(scene.target(), None);
        assert_eq!(scene.effect_percent(), 0.0);
        assert_eq!(scene.clouds(), CloudLayers::new());
    }

    #[test]
    fn clip_planes_come_from_the_config() {
        let scene = WaterScene::new(SceneConfig::new().clip_planes(0.5, 500.0));
        assert_eq!((scene.camera().near, scene.camera().far), (0.5, 500.0));

        let scene = WaterScene::default();
        assert_eq!((scene.camera().near, scene.camera().far), (1.0, 20_000.0));
    }
}
