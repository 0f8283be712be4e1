//! wgpu backend for the prism rendering core.
//!
//! Implements [`prism_render::GraphicsContext`] and
//! [`prism_render::ResourceFactory`] on top of a wgpu device.
//!
//! # Invariants
//! - One render pipeline exists per (vertex shader, pixel shader, pipeline
//!   state) triple; pipelines are created on first use and never evicted.
//! - Draw state is validated when the draw is recorded, so `submit` never
//!   meets an unknown handle.
//! - Meshes and textures are immutable once uploaded.

mod gpu;
pub mod shaders;

pub use gpu::WgpuContext;

pub fn crate_info() -> &'static str {
    "prism-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("wgpu"));
    }
}
