use crate::context::{MaterialParams, TextureBinding};
use glam::Vec4;
use prism_common::{RenderPriority, ShaderHandle, TextureHandle};

/// Shader pair plus the parameters they read. Built once, then shared by
/// handle and never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    name: String,
    color_tint: Vec4,
    vertex_shader: ShaderHandle,
    pixel_shader: ShaderHandle,
    diffuse: Option<TextureHandle>,
    normal_map: Option<TextureHandle>,
    priority: RenderPriority,
}

impl Material {
    pub fn new(
        name: impl Into<String>,
        color_tint: Vec4,
        vertex_shader: ShaderHandle,
        pixel_shader: ShaderHandle,
    ) -> Self {
        Self {
            name: name.into(),
            color_tint,
            vertex_shader,
            pixel_shader,
            diffuse: None,
            normal_map: None,
            priority: RenderPriority::default(),
        }
    }

    pub fn with_diffuse(mut self, texture: TextureHandle) -> Self {
        self.diffuse = Some(texture);
        self
    }

    pub fn with_normal_map(mut self, texture: TextureHandle) -> Self {
        self.normal_map = Some(texture);
        self
    }

    pub fn with_priority(mut self, priority: RenderPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color_tint(&self) -> Vec4 {
        self.color_tint
    }

    pub fn vertex_shader(&self) -> ShaderHandle {
        self.vertex_shader
    }

    pub fn pixel_shader(&self) -> ShaderHandle {
        self.pixel_shader
    }

    pub fn diffuse(&self) -> Option<TextureHandle> {
        self.diffuse
    }

    pub fn normal_map(&self) -> Option<TextureHandle> {
        self.normal_map
    }

    pub fn priority(&self) -> RenderPriority {
        self.priority
    }

    pub fn params(&self) -> MaterialParams {
        MaterialParams {
            color_tint: self.color_tint,
            textures: TextureBinding::Surface {
                diffuse: self.diffuse,
                normal_map: self.normal_map,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let m = Material::new("brick", Vec4::ONE, ShaderHandle(0), ShaderHandle(1))
            .with_diffuse(TextureHandle(4))
            .with_normal_map(TextureHandle(5))
            .with_priority(RenderPriority(2));
        assert_eq!(m.diffuse(), Some(TextureHandle(4)));
        assert_eq!(m.normal_map(), Some(TextureHandle(5)));
        assert_eq!(m.priority(), RenderPriority(2));
    }

    #[test]
    fn params_carry_surface_textures() {
        let m = Material::new("plain", Vec4::new(1.0, 0.0, 0.0, 1.0), ShaderHandle(0), ShaderHandle(1))
            .with_diffuse(TextureHandle(9));
        let p = m.params();
        assert_eq!(p.color_tint, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(
            p.textures,
            TextureBinding::Surface {
                diffuse: Some(TextureHandle(9)),
                normal_map: None
            }
        );
    }
}
