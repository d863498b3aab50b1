//! The fixed set of things the water scene draws.

use std::collections::BTreeMap;

use glam::{Mat4, Vec3};

use crate::backend::{MaterialId, MeshId};

/// Scene layers. The ordering is the draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Sky,
    Terrain,
    Water,
}

/// A mesh paired with its material and placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drawable {
    pub mesh: MeshId,
    pub material: MaterialId,
    pub transform: Mat4,
    /// Off for backgrounds that must never occlude anything.
    pub depth_test: bool,
    /// Lit drawables receive the scene light.
    pub lit: bool,
}

impl Drawable {
    pub fn new(mesh: MeshId, material: MaterialId) -> Self {
        Self {
            mesh,
            material,
            transform: Mat4::IDENTITY,
            depth_test: true,
            lit: false,
        }
    }

    pub fn scaled(mut self, scale: Vec3) -> Self {
        self.transform = Mat4::from_scale(scale);
        self
    }

    pub fn depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    pub fn lit(mut self) -> Self {
        self.lit = true;
        self
    }
}

/// One drawable per layer, iterated in draw order.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    layers: BTreeMap<Layer, Drawable>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `drawable` on `layer`, returning whatever was there.
    pub fn insert(&mut self, layer: Layer, drawable: Drawable) -> Option<Drawable> {
        self.layers.insert(layer, drawable)
    }

    pub fn get(&self, layer: Layer) -> Option<&Drawable> {
        self.layers.get(&layer)
    }

    /// Drawables in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &Drawable)> {
        self.layers.iter().map(|(layer, d)| (*layer, d))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
