//! Named shader inputs attached to a material.
//!
//! A [`UniformBlock`] is an ordered list of named values that packs into a single
//! uniform buffer. Field order is the declaration order, and offsets follow the
//! WGSL uniform address space layout rules, so the matching WGSL struct just lists
//! the same fields in the same order:
//!
//! ```
//! use tidewater::{UniformBlock, UniformValue, Vec2};
//!
//! let block = UniformBlock::new()
//!     .with("u_tex_offset1", UniformValue::Vec2(Vec2::ZERO))
//!     .with("u_tex_offset2", UniformValue::Vec2(Vec2::ZERO));
//! assert_eq!(block.offset_of("u_tex_offset2"), Some(8));
//! assert_eq!(block.size(), 16);
//! ```
//!
//! Texture inputs are described by [`TextureBinding`], which names either a loaded
//! texture or the color attachment of an offscreen render target.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::backend::{TargetId, TextureId};

/// Errors raised when writing a uniform.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum UniformError {
    #[error("uniform '{0}' is not declared by this material")]
    Unknown(String),

    #[error("uniform '{name}' is {expected:?}, got {found:?}")]
    TypeMismatch {
        name: String,
        expected: UniformKind,
        found: UniformKind,
    },
}

/// The shape of a uniform value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    /// `(alignment, size)` in bytes under WGSL uniform layout rules.
    pub const fn layout(self) -> (usize, usize) {
        match self {
            UniformKind::Int | UniformKind::Float => (4, 4),
            UniformKind::Vec2 => (8, 8),
            UniformKind::Vec3 => (16, 12),
            UniformKind::Vec4 => (16, 16),
            UniformKind::Mat4 => (16, 64),
        }
    }
}

/// A single uniform value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        match self {
            UniformValue::Int(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float(v) => out.copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec3(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Vec4(v) => out.copy_from_slice(bytemuck::cast_slice(&v.to_array())),
            UniformValue::Mat4(v) => {
                out.copy_from_slice(bytemuck::cast_slice(&v.to_cols_array()))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct UniformEntry {
    name: String,
    value: UniformValue,
    offset: usize,
}

/// Ordered, named uniforms packed into one buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformBlock {
    entries: Vec<UniformEntry>,
    cursor: usize,
}

impl UniformBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a uniform after the existing ones.
    ///
    /// Redeclaring a name replaces its value. A redeclaration with a different
    /// kind is rejected and the original declaration is kept; see [`Self::declare`].
    pub fn with(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        let name = name.into();
        if let Err(err) = self.declare(&name, value) {
            log::warn!("Ignoring redeclaration of uniform: {err}");
        }
        self
    }

    /// Declares `name`, or replaces its value if it already exists with the same kind.
    pub fn declare(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        match self.set(name, value) {
            Err(UniformError::Unknown(_)) => {}
            result => return result,
        }
        let (align, size) = value.kind().layout();
        let offset = self.cursor.next_multiple_of(align);
        self.cursor = offset + size;
        self.entries.push(UniformEntry {
            name: name.to_string(),
            value,
            offset,
        });
        Ok(())
    }

    /// Overwrites a declared uniform. The kind must match the declaration.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        if entry.value.kind() != value.kind() {
            return Err(UniformError::TypeMismatch {
                name: name.to_string(),
                expected: entry.value.kind(),
                found: value.kind(),
            });
        }
        entry.value = value;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.offset)
    }

    /// Uniform names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Buffer size in bytes. Never zero, always a multiple of 16.
    pub fn size(&self) -> usize {
        self.cursor.max(16).next_multiple_of(16)
    }

    /// Packs every value at its offset. Padding bytes are zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.size()];
        for entry in &self.entries {
            let (_, size) = entry.value.kind().layout();
            entry
                .value
                .write_to(&mut bytes[entry.offset..entry.offset + size]);
        }
        bytes
    }
}

/// Where a material's texture input comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSource {
    /// A texture created with `create_texture`.
    Texture(TextureId),
    /// The color attachment of an offscreen render target.
    Target(TargetId),
}

/// A named texture input, bound in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureBinding {
    pub name: String,
    pub source: TextureSource,
}

impl TextureBinding {
    pub fn new(name: impl Into<String>, source: TextureSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phong_block_matches_wgsl_layout() {
        // struct { ambient: vec3f, diffuse: vec3f, specular: vec3f,
        //          shininess: f32, tex_repeat: i32 }
        let block = UniformBlock::new()
            .with("u_ambient", UniformValue::Vec3(Vec3::ONE))
            .with("u_diffuse", UniformValue::Vec3(Vec3::splat(0.9)))
            .with("u_specular", UniformValue::Vec3(Vec3::ZERO))
            .with("u_shininess", UniformValue::Float(0.0))
            .with("u_tex_repeat", UniformValue::Int(10));

        assert_eq!(block.offset_of("u_ambient"), Some(0));
        assert_eq!(block.offset_of("u_diffuse"), Some(16));
        assert_eq!(block.offset_of("u_specular"), Some(32));
        // scalars pack into the tail of a vec3
        assert_eq!(block.offset_of("u_shininess"), Some(44));
        assert_eq!(block.offset_of("u_tex_repeat"), Some(48));
        assert_eq!(block.size(), 64);
    }

    #[test]
    fn vec2_after_scalars_aligns_to_eight() {
        let block = UniformBlock::new()
            .with("u_percent", UniformValue::Float(0.0))
            .with("u_effect", UniformValue::Int(1))
            .with("u_texel", UniformValue::Vec2(Vec2::ZERO))
            .with("u_extra", UniformValue::Float(0.0))
            .with("u_other", UniformValue::Vec2(Vec2::ZERO));

        assert_eq!(block.offset_of("u_texel"), Some(8));
        assert_eq!(block.offset_of("u_extra"), Some(16));
        assert_eq!(block.offset_of("u_other"), Some(24));
        assert_eq!(block.size(), 32);
    }

    #[test]
    fn empty_block_still_has_a_bindable_size() {
        assert_eq!(UniformBlock::new().size(), 16);
        assert!(UniformBlock::new().to_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn set_rejects_unknown_names_and_kind_changes() {
        let mut block = UniformBlock::new().with("u_time", UniformValue::Float(0.0));

        assert_eq!(
            block.set("u_missing", UniformValue::Float(1.0)),
            Err(UniformError::Unknown("u_missing".into()))
        );
        assert_eq!(
            block.set("u_time", UniformValue::Int(1)),
            Err(UniformError::TypeMismatch {
                name: "u_time".into(),
                expected: UniformKind::Float,
                found: UniformKind::Int,
            })
        );

        block.set("u_time", UniformValue::Float(2.5)).unwrap();
        assert_eq!(block.get("u_time"), Some(UniformValue::Float(2.5)));
    }

    #[test]
    fn redeclaring_a_name_keeps_the_layout() {
        let block = UniformBlock::new()
            .with("u_a", UniformValue::Float(1.0))
            .with("u_b", UniformValue::Vec4(Vec4::ONE))
            .with("u_a", UniformValue::Float(3.0));

        assert_eq!(block.len(), 2);
        assert_eq!(block.get("u_a"), Some(UniformValue::Float(3.0)));
        assert_eq!(block.offset_of("u_b"), Some(16));
    }

    #[test]
    fn redeclaring_with_another_kind_is_rejected() {
        let mut block = UniformBlock::new().with("u_a", UniformValue::Float(1.0));

        let err = block.declare("u_a", UniformValue::Vec2(Vec2::ONE)).unwrap_err();
        assert_eq!(
            err,
            UniformError::TypeMismatch {
                name: "u_a".into(),
                expected: UniformKind::Float,
                found: UniformKind::Vec2,
            }
        );

        let block = block.with("u_a", UniformValue::Vec4(Vec4::ONE));
        assert_eq!(block.len(), 1);
        assert_eq!(block.get("u_a"), Some(UniformValue::Float(1.0)));
        assert_eq!(block.size(), 16);
    }

    #[test]
    fn bytes_land_at_their_offsets() {
        let block = UniformBlock::new()
            .with("u_percent", UniformValue::Float(0.5))
            .with("u_effect", UniformValue::Int(3))
            .with("u_texel", UniformValue::Vec2(Vec2::new(0.25, 0.125)));

        let bytes = block.to_bytes();
        let floats: &[f32] = bytemuck::cast_slice(&bytes);
        let ints: &[i32] = bytemuck::cast_slice(&bytes);

        assert_eq!(floats[0], 0.5);
        assert_eq!(ints[1], 3);
        assert_eq!(floats[2], 0.25);
        assert_eq!(floats[3], 0.125);
    }
}
