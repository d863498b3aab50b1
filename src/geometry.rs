//! CPU-side mesh generation.
//!
//! Every drawable in the scene starts as [`MeshData`] built here, and is uploaded
//! through [`RenderBackend::create_mesh`](crate::RenderBackend::create_mesh).
//! All generators use counter-clockwise front faces:
//!
//! | Generator | Faces | UVs |
//! |-----------|-------|-----|
//! | [`terrain_from_heightmap`] | up | 0..1 across the grid |
//! | [`xz_square`] | up | 0..1 across the square |
//! | [`skydome`] | inward | planar projection on XZ |
//! | [`canvas`] | toward the viewer, in NDC | top-left origin |
//!
//! # Example
//!
//! ```
//! use tidewater::geometry;
//!
//! let water = geometry::xz_square(400.0, 300.0, 11.0);
//! assert_eq!(water.vertices.len(), 4);
//! assert!(water.validate().is_ok());
//! ```

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use image::GrayImage;

use crate::error::SceneError;
use crate::mesh::Vertex3d;

/// Geometry ready for upload.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex3d>,
    /// Triangle list.
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Computes the axis-aligned bounding box.
    ///
    /// Returns `(min, max)` corners of the bounding box.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for v in &self.vertices {
            let p = Vec3::from(v.position);
            min = min.min(p);
            max = max.max(p);
        }

        (min, max)
    }

    /// Unnormalized face normal of triangle `tri`, following its winding.
    pub fn face_normal(&self, tri: usize) -> Vec3 {
        let [p0, p1, p2] = self.triangle(tri);
        (p1 - p0).cross(p2 - p0)
    }

    fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let i = &self.indices[tri * 3..tri * 3 + 3];
        [
            Vec3::from(self.vertices[i[0] as usize].position),
            Vec3::from(self.vertices[i[1] as usize].position),
            Vec3::from(self.vertices[i[2] as usize].position),
        ]
    }

    /// Recalculates vertex normals from face geometry.
    ///
    /// Smooth normals: each vertex averages the area-weighted normals of the
    /// triangles that share it.
    pub fn recalculate_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = [0.0, 0.0, 0.0];
        }

        for tri in 0..self.triangle_count() {
            let face_normal = self.face_normal(tri);
            for k in 0..3 {
                let i = self.indices[tri * 3 + k] as usize;
                let n = Vec3::from(self.vertices[i].normal) + face_normal;
                self.vertices[i].normal = n.into();
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal).normalize_or_zero().into();
        }
    }

    /// Rejects meshes the renderer cannot draw.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(SceneError::Geometry("mesh is empty".into()));
        }
        if self.indices.len() % 3 != 0 {
            return Err(SceneError::Geometry(format!(
                "{} indices do not form whole triangles",
                self.indices.len()
            )));
        }
        let count = self.vertices.len();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(SceneError::Geometry(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        Ok(())
    }
}

/// Builds a terrain grid with one vertex per heightmap pixel.
///
/// The grid is centered on the origin in XZ with one unit between pixels, and
/// each vertex's height is the pixel's luma times `scale`.
pub fn terrain_from_heightmap(heightmap: &GrayImage, scale: f32) -> Result<MeshData, SceneError> {
    let (width, depth) = heightmap.dimensions();
    if width < 2 || depth < 2 {
        return Err(SceneError::Geometry(format!(
            "heightmap must be at least 2x2, got {width}x{depth}"
        )));
    }

    let half_w = (width - 1) as f32 / 2.0;
    let half_d = (depth - 1) as f32 / 2.0;

    let mut vertices = Vec::with_capacity((width * depth) as usize);
    for z in 0..depth {
        for x in 0..width {
            let height = heightmap.get_pixel(x, z).0[0] as f32 * scale;
            vertices.push(Vertex3d::new(
                [x as f32 - half_w, height, z as f32 - half_d],
                [0.0, 1.0, 0.0],
                [
                    x as f32 / (width - 1) as f32,
                    z as f32 / (depth - 1) as f32,
                ],
            ));
        }
    }

    let mut indices = Vec::with_capacity(((width - 1) * (depth - 1) * 6) as usize);
    for z in 0..depth - 1 {
        for x in 0..width - 1 {
            let i0 = z * width + x;
            let i1 = i0 + 1;
            let i2 = i0 + width;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }

    let mut mesh = MeshData::new(vertices, indices);
    mesh.recalculate_normals();
    Ok(mesh)
}

/// Upper hemisphere of radius `radius`, seen from inside.
///
/// `stacks` rings run from the zenith down to the horizon, `slices` segments run
/// around the vertical axis. Normals point toward the center.
pub fn skydome(slices: u32, stacks: u32, radius: f32) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(1);

    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let phi = FRAC_PI_2 * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            vertices.push(Vertex3d::new(
                (dir * radius).into(),
                (-dir).into(),
                [dir.x * 0.5 + 0.5, dir.z * 0.5 + 0.5],
            ));
        }
    }

    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * (slices + 1) + j;
            let b = a + slices + 1;
            let c = a + 1;
            let d = b + 1;
            indices.extend_from_slice(&[a, b, c, c, b, d]);
        }
    }

    MeshData::new(vertices, indices)
}

/// A flat `width` x `depth` square at height `y`, centered on the Y axis.
pub fn xz_square(width: f32, depth: f32, y: f32) -> MeshData {
    let (hw, hd) = (width / 2.0, depth / 2.0);
    let up = [0.0, 1.0, 0.0];
    let vertices = vec![
        Vertex3d::new([-hw, y, -hd], up, [0.0, 0.0]),
        Vertex3d::new([hw, y, -hd], up, [1.0, 0.0]),
        Vertex3d::new([hw, y, hd], up, [1.0, 1.0]),
        Vertex3d::new([-hw, y, hd], up, [0.0, 1.0]),
    ];
    MeshData::new(vertices, vec![0, 2, 1, 0, 3, 2])
}

/// Full-screen quad in normalized device coordinates.
pub fn canvas() -> MeshData {
    let n = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex3d::new([-1.0, -1.0, 0.0], n, [0.0, 1.0]),
        Vertex3d::new([1.0, -1.0, 0.0], n, [1.0, 1.0]),
        Vertex3d::new([1.0, 1.0, 0.0], n, [1.0, 0.0]),
        Vertex3d::new([-1.0, 1.0, 0.0], n, [0.0, 0.0]),
    ];
    MeshData::new(vertices, vec![0, 1, 2, 2, 3, 0])
}
