use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a mesh in an asset library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Index of a material in an asset library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// A shader program registered with a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

/// A texture (2D or cubemap) registered with a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Vertex/index buffer pair owned by a graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GpuMeshId(pub u32);

/// Draw-order tag carried by materials. Lower values draw first.
///
/// Consecutive draws with the same priority share a pixel shader bind in
/// queued rendering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RenderPriority(pub i32);

impl fmt::Display for RenderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_ascending() {
        let mut p = vec![RenderPriority(3), RenderPriority(-1), RenderPriority(0)];
        p.sort();
        assert_eq!(p, vec![RenderPriority(-1), RenderPriority(0), RenderPriority(3)]);
    }

    #[test]
    fn priority_display() {
        assert_eq!(RenderPriority(2).to_string(), "p2");
    }
}
