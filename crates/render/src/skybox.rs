use crate::camera::Camera;
use crate::context::{GraphicsContext, MaterialParams, ObjectUniforms, PipelineState, TextureBinding};
use crate::error::RenderError;
use crate::library::AssetLibrary;
use glam::{Mat4, Vec4};
use prism_common::{MeshHandle, ShaderHandle, TextureHandle};

/// Cubemap drawn behind everything else, after the opaque pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skybox {
    mesh: MeshHandle,
    vertex_shader: ShaderHandle,
    pixel_shader: ShaderHandle,
    cubemap: TextureHandle,
}

impl Skybox {
    pub fn new(
        mesh: MeshHandle,
        vertex_shader: ShaderHandle,
        pixel_shader: ShaderHandle,
        cubemap: TextureHandle,
    ) -> Self {
        Self {
            mesh,
            vertex_shader,
            pixel_shader,
            cubemap,
        }
    }

    pub fn cubemap(&self) -> TextureHandle {
        self.cubemap
    }

    /// Draw the sky, leaving the context in [`PipelineState::Default`] even
    /// when the draw fails.
    pub fn draw<C: GraphicsContext + ?Sized>(
        &self,
        ctx: &mut C,
        camera: &Camera,
        library: &AssetLibrary,
    ) -> Result<(), RenderError> {
        let mesh = library.mesh(self.mesh)?;

        ctx.set_pipeline_state(PipelineState::Skybox);
        ctx.bind_vertex_shader(self.vertex_shader);
        ctx.bind_pixel_shader(self.pixel_shader);
        ctx.push_object_uniforms(&ObjectUniforms {
            world: Mat4::IDENTITY,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
        });
        ctx.push_material(&MaterialParams {
            color_tint: Vec4::ONE,
            textures: TextureBinding::Cubemap(self.cubemap),
        });
        let drawn = mesh.draw(ctx);
        ctx.set_pipeline_state(PipelineState::Default);
        drawn
    }
}
