//! Heightmap and texture images for the scene.
//!
//! Images come either from a resource directory laid out as
//!
//! ```text
//! <dir>/Images/river.jpg        heightmap (any decodable format, read as luma)
//! <dir>/Textures/snow.jpg       terrain layers
//! <dir>/Textures/rock.jpg
//! <dir>/Textures/grass.jpg
//! <dir>/Textures/sand.jpg
//! <dir>/Textures/BlendMap.png   terrain layer weights
//! <dir>/Textures/cloud1.jpg     sky layers
//! <dir>/Textures/cloud2.jpg
//! ```
//!
//! or are generated from a seed, so the scene runs without any files on disk.
//!
//! Blend map channels weight the terrain layers: red is snow, green is rock, blue
//! is sand, and whatever weight remains goes to grass.

use std::path::{Path, PathBuf};

use glam::Vec2;
use image::{GrayImage, Luma, Rgba, RgbaImage};

use crate::error::SceneError;

const PROCEDURAL_TEXTURE_SIZE: u32 = 256;

/// Where [`SceneAssets::load`] gets its images.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    /// A resource directory with `Images/` and `Textures/` subdirectories.
    Directory(PathBuf),
    /// Seeded noise. `size` is the heightmap resolution in pixels.
    Procedural { seed: u32, size: u32 },
}

impl Default for AssetSource {
    fn default() -> Self {
        AssetSource::Procedural { seed: 7, size: 256 }
    }
}

/// Decoded images, ready for mesh generation and texture upload.
#[derive(Clone, Debug)]
pub struct SceneAssets {
    pub heightmap: GrayImage,
    pub snow: RgbaImage,
    pub rock: RgbaImage,
    pub grass: RgbaImage,
    pub sand: RgbaImage,
    pub blend_map: RgbaImage,
    pub cloud1: RgbaImage,
    pub cloud2: RgbaImage,
}

impl SceneAssets {
    pub fn load(source: &AssetSource) -> Result<Self, SceneError> {
        match source {
            AssetSource::Directory(root) => Self::from_directory(root),
            AssetSource::Procedural { seed, size } => Ok(Self::procedural(*seed, *size)),
        }
    }

    pub fn from_directory(root: &Path) -> Result<Self, SceneError> {
        log::info!("Loading scene assets from {}", root.display());
        let textures = root.join("Textures");
        Ok(Self {
            heightmap: open(&root.join("Images").join("river.jpg"))?.to_luma8(),
            snow: open(&textures.join("snow.jpg"))?.to_rgba8(),
            rock: open(&textures.join("rock.jpg"))?.to_rgba8(),
            grass: open(&textures.join("grass.jpg"))?.to_rgba8(),
            sand: open(&textures.join("sand.jpg"))?.to_rgba8(),
            blend_map: open(&textures.join("BlendMap.png"))?.to_rgba8(),
            cloud1: open(&textures.join("cloud1.jpg"))?.to_rgba8(),
            cloud2: open(&textures.join("cloud2.jpg"))?.to_rgba8(),
        })
    }

    /// Generates every image from `seed`. The same seed always gives the same scene.
    pub fn procedural(seed: u32, size: u32) -> Self {
        log::info!("Generating procedural scene assets (seed {seed}, {size}px terrain)");
        let size = size.max(2);
        let heightmap = river_heightmap(size, seed);
        let blend_map = blend_map_for(&heightmap);
        let tex = PROCEDURAL_TEXTURE_SIZE;
        Self {
            snow: speckled(tex, seed.wrapping_add(1), [235, 238, 245], 18),
            rock: cobbles(tex, seed.wrapping_add(2)),
            grass: speckled(tex, seed.wrapping_add(3), [86, 125, 70], 24),
            sand: speckled(tex, seed.wrapping_add(4), [194, 178, 128], 16),
            cloud1: clouds(tex, seed.wrapping_add(5), 4),
            cloud2: clouds(tex, seed.wrapping_add(6), 8),
            heightmap,
            blend_map,
        }
    }
}

fn open(path: &Path) -> Result<image::DynamicImage, SceneError> {
    log::debug!("Decoding {}", path.display());
    image::open(path).map_err(|source| SceneError::Asset {
        path: path.to_path_buf(),
        source,
    })
}

/// Simple hash function for procedural generation.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

fn lattice(x: u32, y: u32, period: u32, seed: u32) -> f32 {
    (hash(x % period, y % period, seed) & 0xffff) as f32 / 65535.0
}

/// Smoothly interpolated value noise in `[0, 1]`, tiling every `period` cells.
fn value_noise(p: Vec2, period: u32, seed: u32) -> f32 {
    let cell = p.floor();
    let f = p - cell;
    let (x, y) = (cell.x as u32, cell.y as u32);
    let s = f * f * (Vec2::splat(3.0) - 2.0 * f);

    let a = lattice(x, y, period, seed);
    let b = lattice(x + 1, y, period, seed);
    let c = lattice(x, y + 1, period, seed);
    let d = lattice(x + 1, y + 1, period, seed);

    let top = a + (b - a) * s.x;
    let bottom = c + (d - c) * s.x;
    top + (bottom - top) * s.y
}

/// Fractal sum of `octaves` noise layers over the unit square, tiling.
fn fbm(uv: Vec2, base_period: u32, octaves: u32, seed: u32) -> f32 {
    let mut sum = 0.0;
    let mut amplitude = 0.5;
    let mut total = 0.0;
    for octave in 0..octaves {
        let period = base_period << octave;
        sum += amplitude * value_noise(uv * period as f32, period, seed.wrapping_add(octave));
        total += amplitude;
        amplitude *= 0.5;
    }
    sum / total
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Rolling hills cut by a meandering river valley running along X.
fn river_heightmap(size: u32, seed: u32) -> GrayImage {
    let extent = (size - 1).max(1) as f32;
    GrayImage::from_fn(size, size, |x, z| {
        let uv = Vec2::new(x as f32 / extent, z as f32 / extent);
        let river_z = 0.5 + 0.15 * (uv.x * std::f32::consts::TAU).sin();
        let bank = smoothstep(0.02, 0.12, (uv.y - river_z).abs());
        let hills = fbm(uv, 4, 5, seed);
        let height = 10.0 + bank * (30.0 + hills * 215.0);
        Luma([height.min(255.0) as u8])
    })
}

/// Layer weights from altitude: sand by the water, grass above it, rock on the
/// upper slopes and snow on the peaks.
fn blend_map_for(heightmap: &GrayImage) -> RgbaImage {
    RgbaImage::from_fn(heightmap.width(), heightmap.height(), |x, z| {
        let h = heightmap.get_pixel(x, z).0[0] as f32 / 255.0;
        let sand = 1.0 - smoothstep(0.12, 0.2, h);
        let rock = smoothstep(0.45, 0.6, h);
        let snow = smoothstep(0.7, 0.8, h);
        let rock = rock * (1.0 - snow);
        let channel = |w: f32| (w.clamp(0.0, 1.0) * 255.0) as u8;
        Rgba([channel(snow), channel(rock), channel(sand), 255])
    })
}

/// A flat color with soft blotches and per-pixel grain.
fn speckled(size: u32, seed: u32, base: [u8; 3], spread: u32) -> RgbaImage {
    let spread = spread.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        let uv = Vec2::new(x as f32, y as f32) / size as f32;
        let soft = (fbm(uv, 8, 3, seed) - 0.5) * spread as f32;
        let grain = (hash(x, y, seed) % spread) as f32 - spread as f32 / 2.0;
        let v = soft + grain;
        let c = |b: u8| (b as f32 + v).clamp(0.0, 255.0) as u8;
        Rgba([c(base[0]), c(base[1]), c(base[2]), 255])
    })
}

/// Blocky gray stones with dark cracks between blocks.
fn cobbles(size: u32, seed: u32) -> RgbaImage {
    let grays: [u8; 6] = [128, 100, 150, 90, 140, 110];
    RgbaImage::from_fn(size, size, |x, y| {
        let block = hash(x / 16, y / 16, seed);
        let base = grays[(block % grays.len() as u32) as usize] as i32;
        let variation = (hash(x, y, seed.wrapping_add(12345)) % 16) as i32 - 8;
        let in_crack = (x % 16 == 0 || y % 16 == 0) && hash(x, y, seed.wrapping_add(999)) % 3 != 0;
        let crack = if in_crack { -30 } else { 0 };
        let v = (base + variation + crack).clamp(0, 255) as u8;
        Rgba([v, v, v, 255])
    })
}

/// Soft white cloud cover on black. Tiles seamlessly.
fn clouds(size: u32, seed: u32, period: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let uv = Vec2::new(x as f32, y as f32) / size as f32;
        let cover = smoothstep(0.45, 0.75, fbm(uv, period, 5, seed));
        let v = (cover * 255.0) as u8;
        Rgba([v, v, v, 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_assets_are_deterministic() {
        let a = SceneAssets::procedural(3, 32);
        let b = SceneAssets::procedural(3, 32);
        assert_eq!(a.heightmap, b.heightmap);
        assert_eq!(a.cloud1, b.cloud1);

        let c = SceneAssets::procedural(4, 32);
        assert_ne!(a.heightmap, c.heightmap);
    }

    #[test]
    fn procedural_heightmap_has_a_riverbed_below_the_water() {
        let assets = SceneAssets::procedural(7, 64);
        assert_eq!(assets.heightmap.dimensions(), (64, 64));
        assert_eq!(assets.blend_map.dimensions(), (64, 64));

        let lowest = assets.heightmap.pixels().map(|p| p.0[0]).min().unwrap();
        let highest = assets.heightmap.pixels().map(|p| p.0[0]).max().unwrap();
        // water sits at 11 units, terrain scale is 0.4 per luma step
        assert!((lowest as f32) * 0.4 < 11.0);
        assert!((highest as f32) * 0.4 > 11.0);
    }

    #[test]
    fn noise_tiles_across_its_period() {
        let period = 4;
        let a = value_noise(Vec2::new(0.25, 1.5), period, 9);
        let b = value_noise(Vec2::new(4.25, 1.5), period, 9);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn missing_directory_is_an_asset_error() {
        let err = SceneAssets::load(&AssetSource::Directory(PathBuf::from(
            "definitely/not/a/resource/dir",
        )))
        .unwrap_err();
        match err {
            SceneError::Asset { path, .. } => assert!(path.ends_with("Images/river.jpg")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
