use glam::Vec3;

/// A directional light with Phong intensities.
///
/// Fixed for the lifetime of the scene and passed by value with every lit draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels, normalized.
    pub direction: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

impl DirectionalLight {
    pub fn new(direction: impl Into<Vec3>) -> Self {
        Self {
            direction: direction.into().normalize_or_zero(),
            ambient: 0.1,
            diffuse: 1.0,
            specular: 1.0,
        }
    }

    pub fn intensities(mut self, ambient: f32, diffuse: f32, specular: f32) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new([1.0, -1.0, -1.0])
    }
}
