//! RGBA8 images and procedural generators for them.

use crate::error::RenderError;
use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

pub const BYTES_PER_TEXEL: usize = 4;

/// Cube face order expected by backends: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACES: usize = 6;

/// A 2D RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    srgb: bool,
}

impl TextureImage {
    /// Color data, sampled as sRGB.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * BYTES_PER_TEXEL;
        if pixels.len() != expected || expected == 0 {
            return Err(RenderError::TextureSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            srgb: true,
        })
    }

    /// Mark the data as linear, e.g. for normal maps.
    pub fn linear(mut self) -> Self {
        self.srgb = false;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn is_srgb(&self) -> bool {
        self.srgb
    }

    pub fn texel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_TEXEL;
        self.pixels
            .get(i..i + BYTES_PER_TEXEL)
            .and_then(|t| t.try_into().ok())
    }
}

/// Six square RGBA8 faces stored face after face.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapImage {
    size: u32,
    pixels: Vec<u8>,
}

impl CubemapImage {
    pub fn new(size: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = face_len(size) * CUBE_FACES;
        if pixels.len() != expected || expected == 0 {
            return Err(RenderError::TextureSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { size, pixels })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn face(&self, face: usize) -> Option<&[u8]> {
        let len = face_len(self.size);
        self.pixels.get(face * len..(face + 1) * len)
    }
}

fn face_len(size: u32) -> usize {
    size as usize * size as usize * BYTES_PER_TEXEL
}

/// Single-texel image.
pub fn solid(color: [u8; 4]) -> TextureImage {
    TextureImage {
        width: 1,
        height: 1,
        pixels: color.to_vec(),
        srgb: true,
    }
}

/// `cells` x `cells` checkerboard alternating `a` and `b`.
pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> TextureImage {
    let size = size.max(1);
    let cell = (size / cells.max(1)).max(1);
    let mut pixels = Vec::with_capacity(face_len(size));
    for y in 0..size {
        for x in 0..size {
            let even = (x / cell + y / cell) % 2 == 0;
            pixels.extend_from_slice(if even { &a } else { &b });
        }
    }
    TextureImage {
        width: size,
        height: size,
        pixels,
        srgb: true,
    }
}

fn encode_normal(n: Vec3) -> [u8; 4] {
    let c = (n.normalize_or(Vec3::Z) * 0.5 + 0.5) * 255.0;
    [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, 255]
}

/// Tangent-space normal map that leaves surface normals unchanged.
pub fn flat_normal() -> TextureImage {
    TextureImage {
        width: 1,
        height: 1,
        pixels: encode_normal(Vec3::Z).to_vec(),
        srgb: false,
    }
}

/// Tangent-space normal map of an egg-crate height field with `waves`
/// periods per side.
pub fn ripple_normal(size: u32, waves: f32, strength: f32) -> TextureImage {
    let size = size.max(1);
    let mut pixels = Vec::with_capacity(face_len(size));
    for y in 0..size {
        for x in 0..size {
            let uv = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) / size as f32 * TAU * waves;
            let dx = uv.x.cos() * uv.y.sin() * strength;
            let dy = uv.x.sin() * uv.y.cos() * strength;
            pixels.extend_from_slice(&encode_normal(Vec3::new(-dx, -dy, 1.0)));
        }
    }
    TextureImage {
        width: size,
        height: size,
        pixels,
        srgb: false,
    }
}

/// World direction through texel (`s`, `t`) of `face`, with `s`, `t` in [-1, 1].
fn cube_direction(face: usize, s: f32, t: f32) -> Vec3 {
    match face {
        0 => Vec3::new(1.0, -t, -s),
        1 => Vec3::new(-1.0, -t, s),
        2 => Vec3::new(s, 1.0, t),
        3 => Vec3::new(s, -1.0, -t),
        4 => Vec3::new(s, -t, 1.0),
        _ => Vec3::new(-s, -t, -1.0),
    }
}

/// Sky that blends from `horizon` to `zenith` above the horizon and is a flat
/// `ground` color below it.
pub fn sky_gradient(size: u32, zenith: [u8; 3], horizon: [u8; 3], ground: [u8; 3]) -> CubemapImage {
    let size = size.max(1);
    let zenith = Vec3::from_array(zenith.map(f32::from));
    let horizon = Vec3::from_array(horizon.map(f32::from));
    let ground = Vec3::from_array(ground.map(f32::from));

    let mut pixels = Vec::with_capacity(face_len(size) * CUBE_FACES);
    for face in 0..CUBE_FACES {
        for y in 0..size {
            for x in 0..size {
                let s = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let t = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
                let up = cube_direction(face, s, t).normalize().y;
                let c = if up >= 0.0 {
                    horizon.lerp(zenith, up.sqrt())
                } else {
                    ground
                };
                pixels.extend_from_slice(&[
                    c.x.round() as u8,
                    c.y.round() as u8,
                    c.z.round() as u8,
                    255,
                ]);
            }
        }
    }
    CubemapImage { size, pixels }
}
