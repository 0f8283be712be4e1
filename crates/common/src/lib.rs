//! Shared types used across the prism crates.
//!
//! # Invariants
//! - A [`Transform`]'s cached world matrix is valid iff it is not dirty.
//! - Handles are plain arena indices; they carry no ownership.

mod transform;
mod types;

pub use transform::Transform;
pub use types::{GpuMeshId, MaterialHandle, MeshHandle, RenderPriority, ShaderHandle, TextureHandle};
