use crate::assets::GameAssets;
use crate::config::GameConfig;
use prism_input::InputSnapshot;
use prism_render::{
    Camera, DrawMode, FrameStats, GraphicsContext, Lighting, RenderError, Renderer,
    ResourceFactory,
};
use prism_scene::Scene;

/// The demo: owns the scene, camera and renderer and drives them once per
/// frame. The platform layer supplies the graphics context and the input.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    assets: GameAssets,
    scene: Scene,
    camera: Camera,
    renderer: Renderer,
    mode: DrawMode,
    lighting: Lighting,
    total_time: f32,
    last_stats: FrameStats,
}

impl Game {
    /// Load assets through `ctx` and populate the starting scene.
    pub fn new<C>(ctx: &mut C, config: GameConfig) -> Result<Self, RenderError>
    where
        C: GraphicsContext + ResourceFactory + ?Sized,
    {
        let assets = GameAssets::load(ctx)?;

        let mut scene =
            Scene::new(config.seed).with_spawn_region(config.spawn_center, config.spawn_half_extent);
        for entity in assets.showcase() {
            scene.spawn(entity.clone());
        }
        scene.add_geometry(config.initial_entities, assets.palette());

        let camera = Camera::with_settings(
            config.camera_position,
            config.window.aspect_ratio(),
            config.camera,
        );
        let renderer = Renderer::new().with_clear_color(config.clear_color);

        tracing::info!(
            entities = scene.len(),
            mode = %config.draw_mode,
            "game initialised"
        );

        Ok(Self {
            mode: config.draw_mode,
            lighting: config.lighting.clone(),
            config,
            assets,
            scene,
            camera,
            renderer,
            total_time: 0.0,
            last_stats: FrameStats::default(),
        })
    }

    /// Track a new surface size. A zero height (minimised window) is ignored.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera
            .update_projection_matrix(width as f32 / height as f32);
    }

    pub fn update(&mut self, dt: f32, input: &InputSnapshot) {
        self.total_time += dt;
        self.camera.update(dt, input);
        self.scene.animate(dt, self.total_time);
    }

    /// Record one frame: clear, lights, entities, sky, submit.
    pub fn draw<C: GraphicsContext + ?Sized>(
        &mut self,
        ctx: &mut C,
    ) -> Result<FrameStats, RenderError> {
        if !self.scene.drain_events().is_empty() {
            self.renderer.set_dirty();
        }

        self.renderer.clear_background(ctx);
        self.renderer.push_lighting(ctx, &self.lighting);
        let stats = self.renderer.draw(
            self.mode,
            ctx,
            self.scene.entities_mut(),
            &self.camera,
            self.assets.library(),
        )?;
        self.assets
            .skybox()
            .draw(ctx, &self.camera, self.assets.library())?;
        ctx.submit()?;

        self.last_stats = stats;
        Ok(stats)
    }

    /// Add `count` entities from the palette. Returns how many were added.
    pub fn add_geometry(&mut self, count: usize) -> usize {
        self.scene.add_geometry(count, self.assets.palette())
    }

    /// Remove up to `count` entities. Returns how many were removed.
    pub fn remove_geometry(&mut self, count: usize) -> usize {
        self.scene.remove_geometry(count)
    }

    pub fn batch_size(&self) -> usize {
        self.config.batch_size
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DrawMode) {
        if mode != self.mode {
            tracing::info!(%mode, "draw mode changed");
            self.mode = mode;
        }
    }

    pub fn toggle_mode(&mut self) -> DrawMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn assets(&self) -> &GameAssets {
        &self.assets
    }

    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Counters from the most recent successful [`Game::draw`].
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use prism_input::Key;
    use prism_render::{DrawCommand, PipelineState, RecordingContext};

    fn game(initial_entities: usize, mode: DrawMode) -> (RecordingContext, Game) {
        let mut ctx = RecordingContext::new();
        let config = GameConfig {
            initial_entities,
            draw_mode: mode,
            ..GameConfig::default()
        };
        let game = Game::new(&mut ctx, config).unwrap();
        (ctx, game)
    }

    #[test]
    fn starts_with_showcase_and_initial_batch() {
        let (_, game) = game(30, DrawMode::Immediate);
        assert_eq!(game.scene().len(), game.assets().showcase().len() + 30);
        assert!(game.renderer().is_dirty());
    }

    #[test]
    fn immediate_frame_draws_every_entity_and_the_sky() {
        let (mut ctx, mut game) = game(20, DrawMode::Immediate);
        let stats = game.draw(&mut ctx).unwrap();
        assert_eq!(stats.draws, game.scene().len());
        assert_eq!(stats.pixel_shader_binds, game.scene().len());

        let draws = ctx
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Draw { .. }))
            .count();
        assert_eq!(draws, game.scene().len() + 1);
        assert!(matches!(ctx.commands()[0], DrawCommand::Clear { .. }));
        assert!(matches!(ctx.commands()[1], DrawCommand::Lighting { .. }));
        assert_eq!(ctx.frames_submitted(), 1);
        assert_eq!(ctx.pipeline_state(), PipelineState::Default);
    }

    #[test]
    fn queued_frame_binds_one_pixel_shader_per_priority() {
        let (mut ctx, mut game) = game(50, DrawMode::Queued);
        let stats = game.draw(&mut ctx).unwrap();
        assert_eq!(stats.draws, game.scene().len());
        assert_eq!(stats.pixel_shader_binds, 2);
        assert!(!game.renderer().is_dirty());
        assert_eq!(game.last_stats(), stats);
    }

    #[test]
    fn geometry_changes_requeue_before_next_frame() {
        let (mut ctx, mut game) = game(10, DrawMode::Queued);
        game.draw(&mut ctx).unwrap();

        assert_eq!(game.add_geometry(game.batch_size()), 100);
        let stats = game.draw(&mut ctx).unwrap();
        assert_eq!(stats.draws, game.scene().len());
        assert_eq!(game.renderer().queue().len(), game.scene().len());

        assert_eq!(game.remove_geometry(25), 25);
        let stats = game.draw(&mut ctx).unwrap();
        assert_eq!(stats.draws, game.scene().len());
    }

    #[test]
    fn empty_scene_still_draws_sky_and_submits() {
        let (mut ctx, mut game) = game(0, DrawMode::Queued);
        let total = game.scene().len();
        assert_eq!(game.remove_geometry(total + 10), total);

        let stats = game.draw(&mut ctx).unwrap();
        assert_eq!(stats.draws, 0);
        assert_eq!(ctx.frames_submitted(), 1);
        assert!(ctx
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Draw { .. })));
    }

    #[test]
    fn toggle_switches_modes() {
        let (mut ctx, mut game) = game(5, DrawMode::Immediate);
        assert_eq!(game.toggle_mode(), DrawMode::Queued);
        game.draw(&mut ctx).unwrap();
        assert_eq!(game.toggle_mode(), DrawMode::Immediate);
        game.set_mode(DrawMode::Immediate);
        assert_eq!(game.mode(), DrawMode::Immediate);
    }

    #[test]
    fn update_moves_camera_and_advances_time() {
        let (_, mut game) = game(0, DrawMode::Immediate);
        let start = game.camera().position();
        let input = InputSnapshot::new().with_key(Key::W);
        game.update(0.5, &input);

        assert!((game.total_time() - 0.5).abs() < 1e-6);
        let moved = game.camera().position() - start;
        assert!(moved.z > 0.0);
        assert!(moved.x.abs() < 1e-5);
    }

    #[test]
    fn update_animates_showcase() {
        let (_, mut game) = game(0, DrawMode::Immediate);
        // Index 1 is the spinning cube.
        let before = game.scene().get(1).unwrap().transform().pitch_yaw_roll();
        game.update(1.0, &InputSnapshot::new());
        let after = game.scene().get(1).unwrap().transform().pitch_yaw_roll();
        assert!((after - before).length() > 1.0);
        assert_eq!(
            game.scene().get(0).unwrap().transform().position(),
            Vec3::new(0.0, -4.0, 15.0)
        );
    }

    #[test]
    fn resize_updates_aspect_and_ignores_zero() {
        let (_, mut game) = game(0, DrawMode::Immediate);
        game.on_resize(800, 800);
        assert!((game.camera().aspect_ratio() - 1.0).abs() < 1e-6);
        game.on_resize(800, 0);
        assert!((game.camera().aspect_ratio() - 1.0).abs() < 1e-6);
    }
}
