//! In-memory [`GraphicsContext`].
//!
//! Records every call as a [`DrawCommand`] and validates draws against the
//! bound state the same way the GPU backend does. Used by tests and by the
//! headless CLI.

use crate::context::{
    GraphicsContext, MaterialParams, ObjectUniforms, PipelineState, ResourceFactory, ShaderProgram,
    ShaderStage, TextureBinding, Vertex,
};
use crate::error::RenderError;
use crate::light::Lighting;
use crate::mesh::validate_geometry;
use crate::texture::{CubemapImage, TextureImage};
use prism_common::{GpuMeshId, ShaderHandle, TextureHandle};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear { color: [f32; 4], depth: f32 },
    PipelineState(PipelineState),
    VertexShader(ShaderHandle),
    PixelShader(ShaderHandle),
    ObjectUniforms(ObjectUniforms),
    Material(MaterialParams),
    Lighting { directional: usize, point: usize },
    Draw { mesh: GpuMeshId, index_count: u32 },
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureKind {
    Flat,
    Cube,
}

#[derive(Debug, Clone, Copy)]
struct RecordedMesh {
    index_count: u32,
}

#[derive(Debug, Default)]
pub struct RecordingContext {
    meshes: Vec<RecordedMesh>,
    shaders: Vec<(String, ShaderStage)>,
    textures: Vec<(String, TextureKind)>,
    commands: Vec<DrawCommand>,
    state: PipelineState,
    vertex_shader: Option<ShaderHandle>,
    pixel_shader: Option<ShaderHandle>,
    material: Option<MaterialParams>,
    frames: u64,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_shader(&mut self, name: impl Into<String>, stage: ShaderStage) -> ShaderHandle {
        self.shaders.push((name.into(), stage));
        ShaderHandle(self.shaders.len() as u32 - 1)
    }

    pub fn add_texture(&mut self, name: impl Into<String>) -> TextureHandle {
        self.push_texture(name.into(), TextureKind::Flat)
    }

    pub fn add_cubemap(&mut self, name: impl Into<String>) -> TextureHandle {
        self.push_texture(name.into(), TextureKind::Cube)
    }

    fn push_texture(&mut self, name: String, kind: TextureKind) -> TextureHandle {
        self.textures.push((name, kind));
        TextureHandle(self.textures.len() as u32 - 1)
    }

    pub fn shader_name(&self, shader: ShaderHandle) -> Option<&str> {
        self.shaders.get(shader.0 as usize).map(|(n, _)| n.as_str())
    }

    pub fn texture_name(&self, texture: TextureHandle) -> Option<&str> {
        self.textures.get(texture.0 as usize).map(|(n, _)| n.as_str())
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over the log recorded so far and start a fresh one.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn frames_submitted(&self) -> u64 {
        self.frames
    }

    pub fn pipeline_state(&self) -> PipelineState {
        self.state
    }

    fn check_shader(&self, bound: Option<ShaderHandle>, expected: ShaderStage) -> Result<(), RenderError> {
        let shader = bound.ok_or(RenderError::ShaderNotBound(expected))?;
        let (_, actual) = self
            .shaders
            .get(shader.0 as usize)
            .ok_or(RenderError::UnknownShader(shader))?;
        if *actual != expected {
            return Err(RenderError::ShaderStage {
                shader,
                expected,
                actual: *actual,
            });
        }
        Ok(())
    }

    fn check_texture(&self, texture: TextureHandle, kind: TextureKind) -> Result<(), RenderError> {
        let (_, actual) = self
            .textures
            .get(texture.0 as usize)
            .ok_or(RenderError::UnknownTexture(texture))?;
        if *actual != kind {
            return Err(RenderError::TextureBindingMismatch(self.state));
        }
        Ok(())
    }

    fn check_material(&self) -> Result<(), RenderError> {
        let Some(material) = self.material else {
            return Ok(());
        };
        match (self.state, material.textures) {
            (PipelineState::Default, TextureBinding::Surface { diffuse, normal_map }) => {
                for texture in diffuse.into_iter().chain(normal_map) {
                    self.check_texture(texture, TextureKind::Flat)?;
                }
                Ok(())
            }
            (PipelineState::Skybox, TextureBinding::Cubemap(texture)) => {
                self.check_texture(texture, TextureKind::Cube)
            }
            (state, _) => Err(RenderError::TextureBindingMismatch(state)),
        }
    }

    /// Human-readable command log.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Command log (frames={}, meshes={}, commands={}) ===",
            self.frames,
            self.meshes.len(),
            self.commands.len()
        );
        for command in &self.commands {
            let line = match command {
                DrawCommand::Clear { color, depth } => format!(
                    "clear color=({:.2}, {:.2}, {:.2}, {:.2}) depth={depth:.1}",
                    color[0], color[1], color[2], color[3]
                ),
                DrawCommand::PipelineState(state) => format!("state {state:?}"),
                DrawCommand::VertexShader(s) => {
                    format!("vs {}", self.shader_name(*s).unwrap_or("?"))
                }
                DrawCommand::PixelShader(s) => {
                    format!("ps {}", self.shader_name(*s).unwrap_or("?"))
                }
                DrawCommand::ObjectUniforms(u) => {
                    let t = u.world.w_axis;
                    format!("object pos=({:.2}, {:.2}, {:.2})", t.x, t.y, t.z)
                }
                DrawCommand::Material(m) => {
                    let c = m.color_tint;
                    format!("material tint=({:.2}, {:.2}, {:.2}, {:.2})", c.x, c.y, c.z, c.w)
                }
                DrawCommand::Lighting { directional, point } => {
                    format!("lighting directional={directional} point={point}")
                }
                DrawCommand::Draw { mesh, index_count } => {
                    format!("draw mesh={} indices={index_count}", mesh.0)
                }
                DrawCommand::Submit => "submit".to_string(),
            };
            let _ = writeln!(out, "  {line}");
        }
        out
    }
}

impl ResourceFactory for RecordingContext {
    fn create_shader(&mut self, program: ShaderProgram) -> Result<ShaderHandle, RenderError> {
        Ok(self.register_shader(program.name(), program.stage()))
    }

    fn create_texture(&mut self, label: &str, _image: &TextureImage) -> Result<TextureHandle, RenderError> {
        Ok(self.add_texture(label))
    }

    fn create_cubemap(&mut self, label: &str, _image: &CubemapImage) -> Result<TextureHandle, RenderError> {
        Ok(self.add_cubemap(label))
    }
}

impl GraphicsContext for RecordingContext {
    fn create_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<GpuMeshId, RenderError> {
        validate_geometry(vertices, indices)?;
        self.meshes.push(RecordedMesh {
            index_count: indices.len() as u32,
        });
        Ok(GpuMeshId(self.meshes.len() as u32 - 1))
    }

    fn clear(&mut self, color: [f32; 4], depth: f32) {
        self.commands.push(DrawCommand::Clear { color, depth });
    }

    fn set_pipeline_state(&mut self, state: PipelineState) {
        self.state = state;
        self.commands.push(DrawCommand::PipelineState(state));
    }

    fn bind_vertex_shader(&mut self, shader: ShaderHandle) {
        self.vertex_shader = Some(shader);
        self.commands.push(DrawCommand::VertexShader(shader));
    }

    fn bind_pixel_shader(&mut self, shader: ShaderHandle) {
        self.pixel_shader = Some(shader);
        self.commands.push(DrawCommand::PixelShader(shader));
    }

    fn push_object_uniforms(&mut self, uniforms: &ObjectUniforms) {
        self.commands.push(DrawCommand::ObjectUniforms(*uniforms));
    }

    fn push_material(&mut self, params: &MaterialParams) {
        self.material = Some(*params);
        self.commands.push(DrawCommand::Material(*params));
    }

    fn push_lighting(&mut self, lighting: &Lighting) {
        self.commands.push(DrawCommand::Lighting {
            directional: lighting.directional().len(),
            point: lighting.point().len(),
        });
    }

    fn draw_indexed(&mut self, mesh: GpuMeshId, index_count: u32) -> Result<(), RenderError> {
        let recorded = self
            .meshes
            .get(mesh.0 as usize)
            .ok_or(RenderError::UnknownGpuMesh(mesh))?;
        if index_count > recorded.index_count {
            return Err(RenderError::IndexOutOfRange {
                index: index_count,
                vertex_count: recorded.index_count as usize,
            });
        }
        self.check_shader(self.vertex_shader, ShaderStage::Vertex)?;
        self.check_shader(self.pixel_shader, ShaderStage::Pixel)?;
        self.check_material()?;
        self.commands.push(DrawCommand::Draw { mesh, index_count });
        Ok(())
    }

    fn submit(&mut self) -> Result<(), RenderError> {
        self.frames += 1;
        self.commands.push(DrawCommand::Submit);
        Ok(())
    }
}
