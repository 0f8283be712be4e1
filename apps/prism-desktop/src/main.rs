use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use prism_game::{Game, GameConfig};
use prism_input::{InputSnapshot, Key};
use prism_render::DrawMode;
use prism_render_wgpu::WgpuContext;
use prism_tools::{FrameTimer, SceneInspector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "prism-desktop", about = "Prism desktop demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scattered entities at startup (overrides the config)
    #[arg(short, long)]
    entities: Option<usize>,

    /// Draw mode: immediate or queued (overrides the config)
    #[arg(short, long)]
    mode: Option<DrawMode>,
}

/// Window, surface and everything created once a device exists.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    ctx: WgpuContext,
    game: Game,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct App {
    config: GameConfig,
    gpu: Option<Gpu>,
    input: InputSnapshot,
    timer: FrameTimer,
    egui_ctx: EguiContext,
    show_overlay: bool,
    last_frame: Instant,
}

impl App {
    fn new(config: GameConfig) -> Self {
        Self {
            config,
            gpu: None,
            input: InputSnapshot::new(),
            timer: FrameTimer::default(),
            egui_ctx: EguiContext::default(),
            show_overlay: true,
            last_frame: Instant::now(),
        }
    }

    fn init_gpu(&self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible graphics adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("prism_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);
        let mut ctx = WgpuContext::new(
            device,
            queue,
            surface_format,
            surface_config.width,
            surface_config.height,
        );
        let mut game = Game::new(&mut ctx, self.config.clone())?;
        game.on_resize(surface_config.width, surface_config.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );

        Ok(Gpu {
            window,
            surface,
            surface_config,
            ctx,
            game,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }
        gpu.surface_config.width = size.width;
        gpu.surface_config.height = size.height;
        gpu.surface.configure(gpu.ctx.device(), &gpu.surface_config);
        gpu.ctx.resize(size.width, size.height);
        gpu.game.on_resize(size.width, size.height);
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, pressed: bool) {
        if let Some(key) = map_key(code) {
            if pressed {
                self.input.press(key);
            } else {
                self.input.release(key);
            }
        }
        if !pressed {
            return;
        }

        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::F1 => self.show_overlay = !self.show_overlay,
            KeyCode::Tab => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.game.toggle_mode();
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        self.timer.record(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.game.update(dt, &self.input);

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(gpu.ctx.device(), &gpu.surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        gpu.ctx.begin_frame(
            frame
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );
        if let Err(e) = gpu.game.draw(&mut gpu.ctx) {
            tracing::error!("frame failed: {e}");
        }

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        draw_overlay(gpu, &self.egui_ctx, &self.timer, self.show_overlay, &view);

        frame.present();
        gpu.window.request_redraw();
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyX => Some(Key::X),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn overlay_ui(ctx: &EguiContext, game: &mut Game, timer: &FrameTimer) {
    let summary = SceneInspector::summary(game.scene(), &game.last_stats(), game.mode());
    let batch = game.batch_size();

    egui::Window::new("Prism")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.label(format!(
                "{:.0} fps ({:.2} ms)",
                timer.fps(),
                timer.average_ms()
            ));
            ui.label(format!("Entities: {}", summary.entity_count));
            ui.label(format!(
                "Draws: {}  VS binds: {}  PS binds: {}",
                summary.stats.draws,
                summary.stats.vertex_shader_binds,
                summary.stats.pixel_shader_binds
            ));
            for (priority, count) in &summary.priorities {
                ui.small(format!("{priority}: {count}"));
            }
            let pos = game.camera().position();
            ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", pos.x, pos.y, pos.z));
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button(format!("Add {batch}")).clicked() {
                    game.add_geometry(batch);
                }
                if ui.button(format!("Remove {batch}")).clicked() {
                    game.remove_geometry(batch);
                }
            });

            let mut mode = game.mode();
            ui.horizontal(|ui| {
                ui.radio_value(&mut mode, DrawMode::Immediate, "Immediate");
                ui.radio_value(&mut mode, DrawMode::Queued, "Queued");
            });
            game.set_mode(mode);

            ui.separator();
            ui.small("WASD: Move | Space/X: Up/Down | LMB drag: Look | Tab: Mode | F1: Overlay");
        });
}

fn draw_overlay(
    gpu: &mut Gpu,
    egui_ctx: &EguiContext,
    timer: &FrameTimer,
    show: bool,
    view: &wgpu::TextureView,
) {
    let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
    let game = &mut gpu.game;
    let full_output = egui_ctx.run(raw_input, |ctx| {
        if show {
            overlay_ui(ctx, game, timer);
        }
    });
    gpu.egui_winit
        .handle_platform_output(&gpu.window, full_output.platform_output);

    let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
    let screen = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [gpu.surface_config.width, gpu.surface_config.height],
        pixels_per_point: full_output.pixels_per_point,
    };

    let device = gpu.ctx.device();
    let queue = gpu.ctx.queue();
    for (id, delta) in &full_output.textures_delta.set {
        gpu.egui_renderer.update_texture(device, queue, *id, delta);
    }
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("egui_encoder"),
    });
    gpu.egui_renderer
        .update_buffers(device, queue, &mut encoder, &paint_jobs, &screen);
    {
        let mut pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            })
            .forget_lifetime();
        gpu.egui_renderer.render(&mut pass, &paint_jobs, &screen);
    }
    queue.submit(std::iter::once(encoder.finish()));
    for id in &full_output.textures_delta.free {
        gpu.egui_renderer.free_texture(id);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let consumed = match &mut self.gpu {
            Some(gpu) => gpu.egui_winit.on_window_event(&gpu.window, &event).consumed,
            None => false,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size),
            WindowEvent::Focused(false) => self.input.clear_buttons(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => {
                self.handle_key(event_loop, code, state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .set_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let held = state == ElementState::Pressed;
                // Releases always land so a drag never sticks.
                if !(held && consumed) {
                    self.input.set_left_button(held);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(entities) = cli.entities {
        config.initial_entities = entities;
    }
    if let Some(mode) = cli.mode {
        config.draw_mode = mode;
    }

    tracing::info!("prism-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
