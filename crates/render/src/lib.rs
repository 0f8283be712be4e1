//! Rendering core: everything between the scene and a graphics backend.
//!
//! # Invariants
//! - The core talks to the GPU only through [`GraphicsContext`].
//! - Renderers never add or remove entities; they only read them and refresh
//!   cached world matrices.
//! - The render queue is valid only while [`Renderer::is_dirty`] is false.
//!
//! [`RecordingContext`] implements the backend trait in memory so the whole
//! frame can be exercised without a GPU.

pub mod camera;
pub mod context;
pub mod error;
pub mod geometry;
pub mod library;
pub mod light;
pub mod material;
pub mod mesh;
pub mod recording;
mod renderer;
pub mod skybox;
pub mod texture;

pub use camera::{Camera, CameraSettings};
pub use context::{
    GraphicsContext, MaterialParams, ObjectUniforms, PipelineState, ResourceFactory, ShaderProgram,
    ShaderStage, TextureBinding, Vertex,
};
pub use error::RenderError;
pub use geometry::MeshData;
pub use library::AssetLibrary;
pub use light::{DirectionalLight, Lighting, PointLight};
pub use material::Material;
pub use mesh::Mesh;
pub use recording::{DrawCommand, RecordingContext};
pub use renderer::{DrawMode, FrameStats, Renderer};
pub use skybox::Skybox;
pub use texture::{CubemapImage, TextureImage};

pub fn crate_info() -> &'static str {
    "prism-render v0.1.0"
}
