//! Material descriptions.
//!
//! A [`MaterialConfig`] is a plain value: the shader it runs, its uniforms with
//! their initial values, and its textures. The scene builds each one completely
//! and hands it to [`RenderBackend::create_material`](crate::RenderBackend::create_material)
//! in a single call. Afterwards only uniform values change.

use glam::{Vec2, Vec3, Vec4};

use crate::bindings::{TextureBinding, TextureSource, UniformBlock, UniformValue};
use crate::config::PostEffect;

pub const U_AMBIENT: &str = "u_ambient";
pub const U_DIFFUSE: &str = "u_diffuse";
pub const U_SPECULAR: &str = "u_specular";
pub const U_SHININESS: &str = "u_shininess";
pub const U_TEX_REPEAT: &str = "u_tex_repeat";
pub const U_TEX_OFFSET1: &str = "u_tex_offset1";
pub const U_TEX_OFFSET2: &str = "u_tex_offset2";
pub const U_COLOR: &str = "u_color";
pub const U_TIME: &str = "u_time";
pub const U_PERCENT: &str = "u_percent";
pub const U_EFFECT: &str = "u_effect";
pub const U_TEXEL: &str = "u_texel";

/// The shader program a material runs.
///
/// Each kind fixes the number of textures its shader samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Lit terrain blending four tiled layers through a blend map.
    Phong,
    /// Two scrolling cloud layers over a sky gradient.
    Sky,
    /// Translucent animated water.
    Water,
    /// Full-screen effect over a render target.
    PostFx,
}

impl MaterialKind {
    pub const fn texture_slots(self) -> usize {
        match self {
            MaterialKind::Phong => 5,
            MaterialKind::Sky => 2,
            MaterialKind::Water => 0,
            MaterialKind::PostFx => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            MaterialKind::Phong => "phong",
            MaterialKind::Sky => "sky",
            MaterialKind::Water => "water",
            MaterialKind::PostFx => "post_fx",
        }
    }
}

/// Phong reflectance coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhongParams {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for PhongParams {
    fn default() -> Self {
        Self {
            ambient: Vec3::ONE,
            diffuse: Vec3::splat(0.9),
            specular: Vec3::ZERO,
            shininess: 0.0,
        }
    }
}

/// A complete material, ready for `create_material`.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialConfig {
    pub label: String,
    pub kind: MaterialKind,
    pub uniforms: UniformBlock,
    /// Bound in order after the uniforms.
    pub textures: Vec<TextureBinding>,
}

impl MaterialConfig {
    pub fn new(label: impl Into<String>, kind: MaterialKind) -> Self {
        Self {
            label: label.into(),
            kind,
            uniforms: UniformBlock::new(),
            textures: Vec::new(),
        }
    }

    pub fn uniform(mut self, name: &str, value: UniformValue) -> Self {
        self.uniforms = self.uniforms.with(name, value);
        self
    }

    pub fn texture(mut self, name: &str, source: TextureSource) -> Self {
        self.textures.push(TextureBinding::new(name, source));
        self
    }

    /// Terrain material. Textures are added separately, in layer order: snow,
    /// rock, grass, sand, then the blend map.
    pub fn phong(label: impl Into<String>, params: PhongParams, texture_repeat: i32) -> Self {
        Self::new(label, MaterialKind::Phong)
            .uniform(U_AMBIENT, UniformValue::Vec3(params.ambient))
            .uniform(U_DIFFUSE, UniformValue::Vec3(params.diffuse))
            .uniform(U_SPECULAR, UniformValue::Vec3(params.specular))
            .uniform(U_SHININESS, UniformValue::Float(params.shininess))
            .uniform(U_TEX_REPEAT, UniformValue::Int(texture_repeat))
    }

    /// Sky material with two cloud layers at their starting offsets.
    pub fn sky(
        label: impl Into<String>,
        cloud1: TextureSource,
        cloud2: TextureSource,
        offset1: Vec2,
        offset2: Vec2,
    ) -> Self {
        Self::new(label, MaterialKind::Sky)
            .uniform(U_TEX_OFFSET1, UniformValue::Vec2(offset1))
            .uniform(U_TEX_OFFSET2, UniformValue::Vec2(offset2))
            .texture("u_tex_cloud1", cloud1)
            .texture("u_tex_cloud2", cloud2)
    }

    pub fn water(label: impl Into<String>, color: Vec4) -> Self {
        Self::new(label, MaterialKind::Water)
            .uniform(U_COLOR, UniformValue::Vec4(color))
            .uniform(U_TIME, UniformValue::Float(0.0))
            .uniform(U_SHININESS, UniformValue::Float(64.0))
    }

    /// Post-effect material sampling `scene`. `texel` is one pixel in UV units.
    pub fn post_fx(
        label: impl Into<String>,
        effect: PostEffect,
        scene: TextureSource,
        texel: Vec2,
    ) -> Self {
        Self::new(label, MaterialKind::PostFx)
            .uniform(U_PERCENT, UniformValue::Float(0.0))
            .uniform(U_EFFECT, UniformValue::Int(effect.shader_index()))
            .uniform(U_TEXEL, UniformValue::Vec2(texel))
            .texture("u_scene", scene)
    }

    /// Texel size for a `width` x `height` target.
    pub fn texel_for(width: u32, height: u32) -> Vec2 {
        Vec2::new(1.0 / width.max(1) as f32, 1.0 / height.max(1) as f32)
    }

    /// Every texture this material reads.
    pub fn sources(&self) -> impl Iterator<Item = TextureSource> + '_ {
        self.textures.iter().map(|t| t.source)
    }
}
