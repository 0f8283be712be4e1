use crate::camera::Camera;
use crate::context::{GraphicsContext, ObjectUniforms};
use crate::error::RenderError;
use crate::library::AssetLibrary;
use crate::light::Lighting;
use prism_common::RenderPriority;
use prism_scene::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the renderer orders draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// Entity order, every shader bound per draw.
    #[default]
    Immediate,
    /// Priority order, pixel shader bound once per priority run.
    Queued,
}

impl DrawMode {
    pub fn toggled(self) -> Self {
        match self {
            DrawMode::Immediate => DrawMode::Queued,
            DrawMode::Queued => DrawMode::Immediate,
        }
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawMode::Immediate => f.write_str("immediate"),
            DrawMode::Queued => f.write_str("queued"),
        }
    }
}

impl FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "immediate" => Ok(DrawMode::Immediate),
            "queued" => Ok(DrawMode::Queued),
            other => Err(format!("unknown draw mode '{other}' (expected immediate or queued)")),
        }
    }
}

/// Counters for one pass over the entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub draws: usize,
    pub vertex_shader_binds: usize,
    pub pixel_shader_binds: usize,
}

/// Issues the per-entity draw calls of a frame.
///
/// The renderer owns no entities. In queued mode it keeps a list of indices
/// into the caller's entity slice, sorted by priority, which is only valid
/// until the entity set changes. Callers report changes with
/// [`Renderer::set_dirty`].
#[derive(Debug, Clone)]
pub struct Renderer {
    queue: Vec<usize>,
    dirty: bool,
    clear_color: [f32; 4],
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            queue: Vec::new(),
            dirty: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn clear_background<C: GraphicsContext + ?Sized>(&self, ctx: &mut C) {
        ctx.clear(self.clear_color, 1.0);
    }

    pub fn push_lighting<C: GraphicsContext + ?Sized>(&self, ctx: &mut C, lighting: &Lighting) {
        ctx.push_lighting(lighting);
    }

    /// Draw every entity in slice order.
    pub fn draw_immediate<C: GraphicsContext + ?Sized>(
        &self,
        ctx: &mut C,
        entities: &mut [Entity],
        camera: &Camera,
        library: &AssetLibrary,
    ) -> Result<FrameStats, RenderError> {
        let mut stats = FrameStats::default();
        for entity in entities.iter_mut() {
            draw_entity(ctx, entity, camera, library, true, &mut stats)?;
        }
        Ok(stats)
    }

    /// Rebuild the queue as entity indices stable-sorted by priority.
    pub fn generate_render_queue(&mut self, entities: &[Entity]) {
        self.queue.clear();
        self.queue.extend(0..entities.len());
        self.queue.sort_by_key(|&i| entities[i].priority());
        self.dirty = false;
        tracing::debug!(entities = entities.len(), "render queue regenerated");
    }

    /// Draw in queue order, binding the pixel shader only when the priority
    /// changes from the previous draw.
    pub fn draw_queued<C: GraphicsContext + ?Sized>(
        &self,
        ctx: &mut C,
        entities: &mut [Entity],
        camera: &Camera,
        library: &AssetLibrary,
    ) -> Result<FrameStats, RenderError> {
        if self.dirty || self.queue.len() != entities.len() {
            return Err(RenderError::StaleRenderQueue);
        }
        let mut stats = FrameStats::default();
        let mut previous: Option<RenderPriority> = None;
        for &index in &self.queue {
            let entity = entities
                .get_mut(index)
                .ok_or(RenderError::StaleRenderQueue)?;
            let bind_pixel = previous != Some(entity.priority());
            previous = Some(entity.priority());
            draw_entity(ctx, entity, camera, library, bind_pixel, &mut stats)?;
        }
        Ok(stats)
    }

    /// Draw in `mode`, regenerating the queue first if it is stale.
    pub fn draw<C: GraphicsContext + ?Sized>(
        &mut self,
        mode: DrawMode,
        ctx: &mut C,
        entities: &mut [Entity],
        camera: &Camera,
        library: &AssetLibrary,
    ) -> Result<FrameStats, RenderError> {
        match mode {
            DrawMode::Immediate => self.draw_immediate(ctx, entities, camera, library),
            DrawMode::Queued => {
                if self.dirty || self.queue.len() != entities.len() {
                    self.generate_render_queue(entities);
                }
                self.draw_queued(ctx, entities, camera, library)
            }
        }
    }

    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn queue(&self) -> &[usize] {
        &self.queue
    }
}

fn draw_entity<C: GraphicsContext + ?Sized>(
    ctx: &mut C,
    entity: &mut Entity,
    camera: &Camera,
    library: &AssetLibrary,
    bind_pixel: bool,
    stats: &mut FrameStats,
) -> Result<(), RenderError> {
    let material = library.material(entity.material())?;
    let mesh = library.mesh(entity.mesh())?;

    ctx.bind_vertex_shader(material.vertex_shader());
    stats.vertex_shader_binds += 1;
    ctx.push_object_uniforms(&ObjectUniforms {
        world: entity.transform_mut().world_matrix(),
        view: camera.view_matrix(),
        projection: camera.projection_matrix(),
    });
    ctx.push_material(&material.params());
    if bind_pixel {
        ctx.bind_pixel_shader(material.pixel_shader());
        stats.pixel_shader_binds += 1;
    }
    mesh.draw(ctx)?;
    stats.draws += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ShaderStage;
    use crate::geometry;
    use crate::material::Material;
    use crate::mesh::Mesh;
    use crate::recording::{DrawCommand, RecordingContext};
    use glam::{Vec3, Vec4};
    use prism_common::{MaterialHandle, MeshHandle, ShaderHandle, Transform};

    struct Fixture {
        ctx: RecordingContext,
        library: AssetLibrary,
        camera: Camera,
        /// Pixel shader of material `i` is `pixel[i]`.
        pixel: Vec<ShaderHandle>,
    }

    /// One material per priority in `priorities`, each with its own pixel shader.
    fn fixture(priorities: &[i32]) -> Fixture {
        let mut ctx = RecordingContext::new();
        let vs = ctx.register_shader("vs", ShaderStage::Vertex);
        let mut library = AssetLibrary::new();
        library.add_mesh(Mesh::from_data(&mut ctx, "cube", &geometry::cube(1.0)).unwrap());
        let mut pixel = Vec::new();
        for (i, &p) in priorities.iter().enumerate() {
            let ps = ctx.register_shader(format!("ps{i}"), ShaderStage::Pixel);
            pixel.push(ps);
            library.add_material(
                Material::new(format!("m{i}"), Vec4::ONE, vs, ps).with_priority(RenderPriority(p)),
            );
        }
        Fixture {
            ctx,
            library,
            camera: Camera::new(Vec3::new(0.0, 0.0, -5.0), 16.0 / 9.0),
            pixel,
        }
    }

    fn entities(f: &Fixture, materials: &[u32]) -> Vec<Entity> {
        materials
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                f.library
                    .entity(MeshHandle(0), MaterialHandle(m))
                    .unwrap()
                    .with_transform(Transform::from_position(Vec3::new(i as f32, 0.0, 0.0)))
            })
            .collect()
    }

    fn pixel_binds(ctx: &RecordingContext) -> Vec<ShaderHandle> {
        ctx.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::PixelShader(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn new_renderer_is_dirty() {
        assert!(Renderer::new().is_dirty());
    }

    #[test]
    fn dirty_flag_follows_last_call() {
        let f = fixture(&[0]);
        let list = entities(&f, &[0, 0]);
        let mut r = Renderer::new();
        r.generate_render_queue(&list);
        assert!(!r.is_dirty());
        r.set_dirty();
        assert!(r.is_dirty());
        r.generate_render_queue(&list);
        assert!(!r.is_dirty());
    }

    #[test]
    fn queue_is_stable_by_priority() {
        let f = fixture(&[2, 0, 1]);
        let list = entities(&f, &[0, 1, 2, 1, 0]);
        let mut r = Renderer::new();
        r.generate_render_queue(&list);
        assert_eq!(r.queue(), &[1, 3, 2, 0, 4]);
        let priorities: Vec<_> = r.queue().iter().map(|&i| list[i].priority()).collect();
        assert!(priorities.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn immediate_binds_every_shader_in_entity_order() {
        let mut f = fixture(&[2, 0, 1]);
        let mut list = entities(&f, &[0, 1, 2, 1, 0]);
        let r = Renderer::new();
        let stats = r
            .draw_immediate(&mut f.ctx, &mut list, &f.camera, &f.library)
            .unwrap();
        assert_eq!(
            stats,
            FrameStats {
                draws: 5,
                vertex_shader_binds: 5,
                pixel_shader_binds: 5
            }
        );
        let p = &f.pixel;
        assert_eq!(pixel_binds(&f.ctx), vec![p[0], p[1], p[2], p[1], p[0]]);
    }

    #[test]
    fn queued_binds_pixel_shader_once_per_priority_run() {
        let mut f = fixture(&[2, 0, 1]);
        let mut list = entities(&f, &[0, 1, 2, 1, 0]);
        let mut r = Renderer::new();
        r.generate_render_queue(&list);
        let stats = r
            .draw_queued(&mut f.ctx, &mut list, &f.camera, &f.library)
            .unwrap();
        assert_eq!(stats.draws, 5);
        assert_eq!(stats.vertex_shader_binds, 5);
        assert_eq!(stats.pixel_shader_binds, 3);
        let p = &f.pixel;
        assert_eq!(pixel_binds(&f.ctx), vec![p[1], p[2], p[0]]);
    }

    #[test]
    fn queued_pushes_each_world_matrix() {
        let mut f = fixture(&[1, 0]);
        let mut list = entities(&f, &[0, 1]);
        let mut r = Renderer::new();
        r.generate_render_queue(&list);
        r.draw_queued(&mut f.ctx, &mut list, &f.camera, &f.library)
            .unwrap();
        let xs: Vec<f32> = f
            .ctx
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::ObjectUniforms(u) => Some(u.world.w_axis.x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![1.0, 0.0]);
    }

    #[test]
    fn queued_refuses_stale_queue() {
        let mut f = fixture(&[0]);
        let mut list = entities(&f, &[0, 0, 0]);
        let mut r = Renderer::new();
        assert!(matches!(
            r.draw_queued(&mut f.ctx, &mut list, &f.camera, &f.library),
            Err(RenderError::StaleRenderQueue)
        ));

        r.generate_render_queue(&list);
        list.pop();
        assert!(matches!(
            r.draw_queued(&mut f.ctx, &mut list, &f.camera, &f.library),
            Err(RenderError::StaleRenderQueue)
        ));
    }

    #[test]
    fn draw_regenerates_when_dirty() {
        let mut f = fixture(&[1, 0]);
        let mut list = entities(&f, &[0, 1]);
        let mut r = Renderer::new();
        let stats = r
            .draw(DrawMode::Queued, &mut f.ctx, &mut list, &f.camera, &f.library)
            .unwrap();
        assert!(!r.is_dirty());
        assert_eq!(r.queue(), &[1, 0]);
        assert_eq!(stats.draws, 2);
    }

    #[test]
    fn unknown_material_aborts_draw() {
        let mut f = fixture(&[0]);
        let mut list = vec![Entity::new(MeshHandle(0), MaterialHandle(5), RenderPriority(0))];
        let r = Renderer::new();
        assert!(matches!(
            r.draw_immediate(&mut f.ctx, &mut list, &f.camera, &f.library),
            Err(RenderError::UnknownMaterial(MaterialHandle(5)))
        ));
    }

    #[test]
    fn clear_uses_configured_color() {
        let mut ctx = RecordingContext::new();
        Renderer::new()
            .with_clear_color([0.1, 0.2, 0.3, 1.0])
            .clear_background(&mut ctx);
        assert_eq!(
            ctx.commands(),
            &[DrawCommand::Clear {
                color: [0.1, 0.2, 0.3, 1.0],
                depth: 1.0
            }]
        );
    }

    #[test]
    fn draw_mode_parses_and_toggles() {
        assert_eq!("Queued".parse::<DrawMode>(), Ok(DrawMode::Queued));
        assert!("fast".parse::<DrawMode>().is_err());
        assert_eq!(DrawMode::Immediate.toggled(), DrawMode::Queued);
        assert_eq!(DrawMode::Queued.to_string(), "queued");
    }
}
