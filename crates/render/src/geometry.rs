//! Procedural meshes.
//!
//! Winding is clockwise as seen from the front in a left-handed, Y-up frame,
//! matching the cull settings of [`crate::PipelineState::Default`].

use crate::context::Vertex;
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// CPU-side vertex and index data ready for upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Append one square face of side `size` centred at `normal * offset`.
    fn push_face(&mut self, normal: Vec3, offset: f32, size: f32) {
        let forward = -normal;
        let up = if normal.y.abs() > 0.5 { Vec3::Z } else { Vec3::Y };
        let right = up.cross(forward);
        let half = size * 0.5;
        let center = normal * offset;

        let base = self.vertices.len() as u32;
        let corners = [
            (-right - up, Vec2::new(0.0, 1.0)),
            (-right + up, Vec2::new(0.0, 0.0)),
            (right + up, Vec2::new(1.0, 0.0)),
            (right - up, Vec2::new(1.0, 1.0)),
        ];
        for (corner, uv) in corners {
            self.vertices
                .push(Vertex::new(center + corner * half, normal, uv, right));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Axis-aligned cube with edge length `size`, centred at the origin.
pub fn cube(size: f32) -> MeshData {
    let mut data = MeshData::default();
    for normal in [Vec3::Z, Vec3::NEG_Z, Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y] {
        data.push_face(normal, size * 0.5, size);
    }
    data
}

/// Square in the XZ plane facing +Y.
pub fn plane(size: f32) -> MeshData {
    let mut data = MeshData::default();
    data.push_face(Vec3::Y, 0.0, size);
    data
}

/// UV sphere. `slices` and `stacks` are clamped to at least 3 and 2.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> MeshData {
    let slices = slices.max(3);
    let stacks = stacks.max(2);
    let mut data = MeshData::default();

    for i in 0..=stacks {
        let phi = PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = TAU * j as f32 / slices as f32;
            let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            let tangent = Vec3::new(-theta.sin(), 0.0, theta.cos());
            let uv = Vec2::new(j as f32 / slices as f32, i as f32 / stacks as f32);
            data.vertices
                .push(Vertex::new(normal * radius, normal, uv, tangent));
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + 1;
            let c = a + row + 1;
            let d = a + row;
            data.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    data
}
