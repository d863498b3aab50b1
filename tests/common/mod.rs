//! A backend that records every call instead of rendering.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use image::RgbaImage;
use tidewater::{
    AssetSource, DrawCall, MaterialConfig, MaterialId, MaterialKind, MeshData, MeshId,
    RasterState, RenderBackend, Resource, SceneConfig, SceneError, TargetBinding, TargetId,
    TextureId, TextureSource, UniformValue, Vec3,
};

/// One recorded backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    CreateMesh(String),
    CreateTexture(String),
    CreateTarget(String),
    CreateMaterial(String, MaterialKind),
    SetUniform(MaterialId, String),
    Bind(TargetId),
    Unbind(TargetId),
    Clear,
    DepthTest(bool),
    Draw(Drawn),
    Release(Resource),
    BeginFrame,
    EndFrame,
}

/// What a draw looked like when it was issued.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawn {
    pub mesh: MeshId,
    pub material: MaterialId,
    /// `None` for the default target.
    pub target: Option<TargetId>,
    pub depth_test: bool,
    pub lit: bool,
    pub camera_position: Vec3,
}

pub struct RecordingBackend {
    pub calls: Vec<Call>,
    pub viewport: (u32, u32),
    pub raster: Option<RasterState>,
    pub live: HashSet<Resource>,
    pub released: Vec<Resource>,
    pub materials: HashMap<MaterialId, MaterialConfig>,
    pub mesh_labels: HashMap<MeshId, String>,
    /// Targets that have received at least one draw, in order.
    pub drawn_into: Vec<TargetId>,
    /// Creating anything with this label fails.
    pub fail_label: Option<String>,
    /// `end_frame` reports a lost surface.
    pub fail_present: bool,
    /// Draws with this kind of material fail with a frame error.
    pub fail_draw: Option<MaterialKind>,
    /// Every `set_uniform` fails with a frame error.
    pub fail_uniforms: bool,
    binding: TargetBinding,
    depth_test: bool,
    next_id: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            viewport: (800, 600),
            raster: None,
            live: HashSet::new(),
            released: Vec::new(),
            materials: HashMap::new(),
            mesh_labels: HashMap::new(),
            drawn_into: Vec::new(),
            fail_label: None,
            fail_present: false,
            fail_draw: None,
            fail_uniforms: false,
            binding: TargetBinding::new(),
            depth_test: true,
            next_id: 0,
        }
    }

    pub fn failing_on(label: &str) -> Self {
        Self {
            fail_label: Some(label.to_string()),
            ..Self::new()
        }
    }

    pub fn draws(&self) -> Vec<&Drawn> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Draw(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::CreateMesh(_)
                        | Call::CreateTexture(_)
                        | Call::CreateTarget(_)
                        | Call::CreateMaterial(..)
                )
            })
            .count()
    }

    pub fn material_kind(&self, id: MaterialId) -> Option<MaterialKind> {
        self.materials.get(&id).map(|m| m.kind)
    }

    pub fn uniform(&self, material: MaterialId, name: &str) -> Option<UniformValue> {
        self.materials.get(&material)?.uniforms.get(name)
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
        self.drawn_into.clear();
    }

    fn check_label(&self, label: &str) -> Result<(), SceneError> {
        if self.fail_label.as_deref() == Some(label) {
            return Err(SceneError::Geometry(format!("injected failure creating '{label}'")));
        }
        Ok(())
    }

    fn issue<T: Into<Resource> + Copy>(&mut self, make: fn(u32) -> T) -> T {
        let handle = make(self.next_id);
        self.next_id += 1;
        self.live.insert(handle.into());
        handle
    }

    fn require(&self, resource: Resource) -> Result<(), SceneError> {
        if self.live.contains(&resource) {
            Ok(())
        } else {
            Err(SceneError::UnknownResource(resource))
        }
    }
}

impl RenderBackend for RecordingBackend {
    fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    fn set_raster_state(&mut self, state: RasterState) {
        self.raster = Some(state);
        self.depth_test = state.depth_test;
    }

    fn create_mesh(&mut self, label: &str, data: &MeshData) -> Result<MeshId, SceneError> {
        self.check_label(label)?;
        data.validate()?;
        self.calls.push(Call::CreateMesh(label.to_string()));
        let id = self.issue(MeshId::new);
        self.mesh_labels.insert(id, label.to_string());
        Ok(id)
    }

    fn create_texture(&mut self, label: &str, _image: &RgbaImage) -> Result<TextureId, SceneError> {
        self.check_label(label)?;
        self.calls.push(Call::CreateTexture(label.to_string()));
        Ok(self.issue(TextureId::new))
    }

    fn create_target(&mut self, label: &str) -> Result<TargetId, SceneError> {
        self.check_label(label)?;
        self.calls.push(Call::CreateTarget(label.to_string()));
        Ok(self.issue(TargetId::new))
    }

    fn create_material(&mut self, config: &MaterialConfig) -> Result<MaterialId, SceneError> {
        self.check_label(&config.label)?;
        let expected = config.kind.texture_slots();
        if config.textures.len() != expected {
            return Err(SceneError::MaterialLayout {
                label: config.label.clone(),
                expected,
                found: config.textures.len(),
            });
        }
        for source in config.sources() {
            let resource = match source {
                TextureSource::Texture(id) => Resource::Texture(id),
                TextureSource::Target(id) => Resource::Target(id),
            };
            self.require(resource)?;
        }
        self.calls
            .push(Call::CreateMaterial(config.label.clone(), config.kind));
        let id = self.issue(MaterialId::new);
        self.materials.insert(id, config.clone());
        Ok(id)
    }

    fn set_uniform(
        &mut self,
        material: MaterialId,
        name: &str,
        value: UniformValue,
    ) -> Result<(), SceneError> {
        self.require(Resource::Material(material))?;
        if self.fail_uniforms {
            return Err(SceneError::Surface(wgpu::SurfaceError::Timeout));
        }
        let config = self
            .materials
            .get_mut(&material)
            .ok_or(SceneError::UnknownResource(Resource::Material(material)))?;
        config.uniforms.set(name, value)?;
        self.calls.push(Call::SetUniform(material, name.to_string()));
        Ok(())
    }

    fn bind_target(&mut self, target: TargetId) -> Result<(), SceneError> {
        self.require(Resource::Target(target))?;
        self.binding.bind(target)?;
        self.calls.push(Call::Bind(target));
        Ok(())
    }

    fn unbind_target(&mut self, target: TargetId) -> Result<(), SceneError> {
        self.binding.unbind(target)?;
        self.calls.push(Call::Unbind(target));
        Ok(())
    }

    fn clear(&mut self, _color: [f32; 4]) {
        self.calls.push(Call::Clear);
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.calls.push(Call::DepthTest(enabled));
    }

    fn draw(&mut self, call: &DrawCall) -> Result<(), SceneError> {
        self.require(Resource::Mesh(call.mesh))?;
        self.require(Resource::Material(call.material))?;
        if self.fail_draw.is_some() && self.fail_draw == self.material_kind(call.material) {
            return Err(SceneError::Surface(wgpu::SurfaceError::Outdated));
        }

        let target = self.binding.bound();
        if let Some(target) = target {
            if self.drawn_into.last() != Some(&target) {
                self.drawn_into.push(target);
            }
        }
        self.calls.push(Call::Draw(Drawn {
            mesh: call.mesh,
            material: call.material,
            target,
            depth_test: self.depth_test,
            lit: call.light.is_some(),
            camera_position: call.camera.position,
        }));
        Ok(())
    }

    fn release(&mut self, resource: Resource) -> Result<(), SceneError> {
        if !self.live.remove(&resource) {
            return Err(SceneError::UnknownResource(resource));
        }
        if let Resource::Material(id) = resource {
            self.materials.remove(&id);
        }
        self.released.push(resource);
        self.calls.push(Call::Release(resource));
        Ok(())
    }

    fn begin_frame(&mut self) {
        self.calls.push(Call::BeginFrame);
        if let Some(raster) = self.raster {
            self.depth_test = raster.depth_test;
        }
    }

    fn end_frame(&mut self) -> Result<(), SceneError> {
        self.calls.push(Call::EndFrame);
        self.binding.finish_frame()?;
        if self.fail_present {
            return Err(SceneError::Surface(wgpu::SurfaceError::Lost));
        }
        Ok(())
    }
}

/// A small procedural scene, cheap enough to build in every test.
pub fn test_config() -> SceneConfig {
    SceneConfig::new().assets(AssetSource::Procedural { seed: 3, size: 32 })
}
