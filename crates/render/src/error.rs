use crate::context::{PipelineState, ShaderStage};
use prism_common::{GpuMeshId, MaterialHandle, MeshHandle, ShaderHandle, TextureHandle};

/// Errors raised at the boundary between the core and a graphics backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("mesh has no vertices or no indices")]
    EmptyMesh,
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("unknown mesh {0:?}")]
    UnknownMesh(MeshHandle),
    #[error("unknown GPU mesh {0:?}")]
    UnknownGpuMesh(GpuMeshId),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialHandle),
    #[error("unknown shader {0:?}")]
    UnknownShader(ShaderHandle),
    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureHandle),
    #[error("shader {shader:?} is a {actual} shader, expected {expected}")]
    ShaderStage {
        shader: ShaderHandle,
        expected: ShaderStage,
        actual: ShaderStage,
    },
    #[error("no {0} shader bound before draw")]
    ShaderNotBound(ShaderStage),
    #[error("texture binding does not fit pipeline state {0:?}")]
    TextureBindingMismatch(PipelineState),
    #[error("texture data is {actual} bytes, expected {expected}")]
    TextureSize { expected: usize, actual: usize },
    #[error("render queue is stale; regenerate it after changing the entity set")]
    StaleRenderQueue,
    #[error("no frame target; begin a frame before submitting")]
    NoFrameTarget,
    #[error("graphics backend: {0}")]
    Backend(String),
}
