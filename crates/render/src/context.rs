//! The seam between the rendering core and a graphics API.

use crate::error::RenderError;
use crate::light::Lighting;
use crate::texture::{CubemapImage, TextureImage};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};
use prism_common::{GpuMeshId, ShaderHandle, TextureHandle};
use std::fmt;

/// Vertex layout shared by every mesh.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2, tangent: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv: uv.to_array(),
            tangent: tangent.to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Pixel,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Pixel => f.write_str("pixel"),
        }
    }
}

/// Fixed-function state a draw runs under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Back-face culling, depth test `Less`, depth writes on.
    #[default]
    Default,
    /// Front-face culling, depth test `LessEqual`, depth writes off. For
    /// geometry drawn at maximum depth from the inside.
    Skybox,
}

/// Shader programs every backend provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    /// Transforms surface vertices into clip space with world-space outputs.
    LitVertex,
    /// Diffuse texture, normal map and scene lighting.
    LitPixel,
    /// Diffuse texture times tint, no lighting.
    UnlitPixel,
    /// Cube drawn at the far plane around the camera.
    SkyVertex,
    SkyPixel,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 5] = [
        ShaderProgram::LitVertex,
        ShaderProgram::LitPixel,
        ShaderProgram::UnlitPixel,
        ShaderProgram::SkyVertex,
        ShaderProgram::SkyPixel,
    ];

    pub fn stage(self) -> ShaderStage {
        match self {
            ShaderProgram::LitVertex | ShaderProgram::SkyVertex => ShaderStage::Vertex,
            ShaderProgram::LitPixel | ShaderProgram::UnlitPixel | ShaderProgram::SkyPixel => {
                ShaderStage::Pixel
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderProgram::LitVertex => "lit_vs",
            ShaderProgram::LitPixel => "lit_ps",
            ShaderProgram::UnlitPixel => "unlit_ps",
            ShaderProgram::SkyVertex => "sky_vs",
            ShaderProgram::SkyPixel => "sky_ps",
        }
    }
}

/// Per-draw transform data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectUniforms {
    pub world: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Textures a draw samples from. Must agree with the active [`PipelineState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureBinding {
    Surface {
        diffuse: Option<TextureHandle>,
        normal_map: Option<TextureHandle>,
    },
    Cubemap(TextureHandle),
}

/// Per-draw material data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialParams {
    pub color_tint: Vec4,
    pub textures: TextureBinding,
}

/// An immediate-style graphics API.
///
/// Binds and pushes update the current state; `draw_indexed` snapshots that
/// state into one draw. Backends may defer the real GPU work until
/// [`GraphicsContext::submit`].
pub trait GraphicsContext {
    /// Upload immutable vertex and index buffers.
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32])
    -> Result<GpuMeshId, RenderError>;

    fn clear(&mut self, color: [f32; 4], depth: f32);

    fn set_pipeline_state(&mut self, state: PipelineState);

    fn bind_vertex_shader(&mut self, shader: ShaderHandle);

    fn bind_pixel_shader(&mut self, shader: ShaderHandle);

    fn push_object_uniforms(&mut self, uniforms: &ObjectUniforms);

    fn push_material(&mut self, params: &MaterialParams);

    /// Frame-wide light data.
    fn push_lighting(&mut self, lighting: &Lighting);

    fn draw_indexed(&mut self, mesh: GpuMeshId, index_count: u32) -> Result<(), RenderError>;

    /// Finish the frame's GPU work.
    fn submit(&mut self) -> Result<(), RenderError>;
}

/// Creation of shaders and textures. Kept apart from [`GraphicsContext`]
/// because it runs once at load time, not per frame.
pub trait ResourceFactory {
    fn create_shader(&mut self, program: ShaderProgram) -> Result<ShaderHandle, RenderError>;

    fn create_texture(&mut self, label: &str, image: &TextureImage)
    -> Result<TextureHandle, RenderError>;

    fn create_cubemap(&mut self, label: &str, image: &CubemapImage)
    -> Result<TextureHandle, RenderError>;
}
