use anyhow::Context as _;
use clap::{Parser, Subcommand};
use prism_game::{Game, GameConfig};
use prism_input::{InputSnapshot, Key};
use prism_render::{DrawMode, FrameStats, RecordingContext};
use prism_tools::{SceneInspector, SceneSummary};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prism-cli", about = "Headless prism runner on the recording backend")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective config as YAML
    Config,
    /// Run frames and report draw statistics
    Frames {
        /// Scattered entities at startup (overrides the config)
        #[arg(short, long)]
        entities: Option<usize>,
        /// Number of frames to draw
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Draw mode: immediate or queued (overrides the config)
        #[arg(short, long)]
        mode: Option<DrawMode>,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Hold W every frame so the camera walks forward
        #[arg(long)]
        walk: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Draw one frame in each mode and compare shader binds
    Compare {
        /// Scattered entities at startup (overrides the config)
        #[arg(short, long)]
        entities: Option<usize>,
    },
    /// Draw one frame and print the recorded command log
    Trace {
        /// Scattered entities at startup (overrides the config)
        #[arg(short, long)]
        entities: Option<usize>,
        /// Draw mode: immediate or queued (overrides the config)
        #[arg(short, long)]
        mode: Option<DrawMode>,
    },
    /// Print one entity after the scene is built
    Inspect {
        /// Entity index
        index: usize,
        /// Scattered entities at startup (overrides the config)
        #[arg(short, long)]
        entities: Option<usize>,
    },
}

#[derive(Serialize)]
struct FramesReport {
    frames: u32,
    seconds: f32,
    camera: [f32; 3],
    commands_recorded: usize,
    summary: SceneSummary,
}

/// Apply command-line overrides on top of the loaded config.
fn resolve(config: &GameConfig, entities: Option<usize>, mode: Option<DrawMode>) -> GameConfig {
    GameConfig {
        initial_entities: entities.unwrap_or(config.initial_entities),
        draw_mode: mode.unwrap_or(config.draw_mode),
        ..config.clone()
    }
}

fn start(
    config: &GameConfig,
    entities: Option<usize>,
    mode: Option<DrawMode>,
) -> anyhow::Result<(RecordingContext, Game)> {
    let mut ctx = RecordingContext::new();
    let game = Game::new(&mut ctx, resolve(config, entities, mode))
        .context("failed to build the scene")?;
    Ok((ctx, game))
}

fn run_frames(
    config: &GameConfig,
    entities: Option<usize>,
    mode: Option<DrawMode>,
    frames: u32,
    dt: f32,
    walk: bool,
) -> anyhow::Result<FramesReport> {
    let (mut ctx, mut game) = start(config, entities, mode)?;
    let mut input = InputSnapshot::new();
    if walk {
        input.press(Key::W);
    }

    let mut stats = FrameStats::default();
    let mut commands_recorded = 0;
    for _ in 0..frames {
        game.update(dt, &input);
        stats = game.draw(&mut ctx)?;
        commands_recorded += ctx.take_commands().len();
    }

    Ok(FramesReport {
        frames,
        seconds: game.total_time(),
        camera: game.camera().position().to_array(),
        commands_recorded,
        summary: SceneInspector::summary(game.scene(), &stats, game.mode()),
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    // Reports go to stdout; keep it clean for `--json` consumers.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("prism-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", prism_input::crate_info());
            println!("render: {}", prism_render::crate_info());
            println!("tools: {}", prism_tools::crate_info());
            println!("game: {}", prism_game::crate_info());
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
        Commands::Frames {
            entities,
            frames,
            mode,
            dt,
            walk,
            json,
        } => {
            let report = run_frames(&config, entities, mode, frames, dt, walk)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Ran {} frames ({:.2}s), {} commands recorded",
                    report.frames, report.seconds, report.commands_recorded
                );
                println!(
                    "Camera: ({:.2}, {:.2}, {:.2})",
                    report.camera[0], report.camera[1], report.camera[2]
                );
                println!("{}", report.summary);
            }
        }
        Commands::Compare { entities } => {
            for mode in [DrawMode::Immediate, DrawMode::Queued] {
                let (mut ctx, mut game) = start(&config, entities, Some(mode))?;
                let stats = game.draw(&mut ctx)?;
                println!(
                    "{:>9}: draws={} vs_binds={} ps_binds={}",
                    mode.to_string(),
                    stats.draws,
                    stats.vertex_shader_binds,
                    stats.pixel_shader_binds
                );
            }
        }
        Commands::Trace { entities, mode } => {
            let (mut ctx, mut game) = start(&config, entities, mode)?;
            game.draw(&mut ctx)?;
            print!("{}", ctx.dump());
        }
        Commands::Inspect { index, entities } => {
            let (_, game) = start(&config, entities, None)?;
            match SceneInspector::inspect_entity(game.scene(), index) {
                Some(info) => println!("{info}"),
                None => anyhow::bail!(
                    "no entity {index}; the scene has {}",
                    game.scene().len()
                ),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GameConfig {
        GameConfig {
            initial_entities: 3,
            draw_mode: DrawMode::Queued,
            ..GameConfig::default()
        }
    }

    #[test]
    fn config_values_hold_without_flags() {
        let cli = Cli::try_parse_from(["prism-cli", "frames", "--frames", "1"]).unwrap();
        let Commands::Frames { entities, mode, .. } = cli.command else {
            panic!("expected the frames command");
        };
        let resolved = resolve(&config(), entities, mode);
        assert_eq!(resolved.initial_entities, 3);
        assert_eq!(resolved.draw_mode, DrawMode::Queued);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from(["prism-cli", "trace", "-e", "7", "-m", "immediate"]).unwrap();
        let Commands::Trace { entities, mode } = cli.command else {
            panic!("expected the trace command");
        };
        let resolved = resolve(&config(), entities, mode);
        assert_eq!(resolved.initial_entities, 7);
        assert_eq!(resolved.draw_mode, DrawMode::Immediate);
    }

    #[test]
    fn frames_report_uses_config_and_serializes_alone() {
        let config = config();
        let report = run_frames(&config, None, None, 1, 0.016, false).unwrap();
        assert_eq!(report.summary.mode, DrawMode::Queued);
        // Four showcase entities plus the three scattered ones.
        assert_eq!(report.summary.entity_count, 7);

        let text = serde_json::to_string_pretty(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["frames"], 1);
    }
}
