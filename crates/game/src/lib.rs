//! The demo itself: asset set, startup config and the per-frame driver.
//!
//! # Invariants
//! - `Game` never talks to a graphics API directly; every GPU effect goes
//!   through the `GraphicsContext` it is handed.
//! - Entity-set changes are observed through scene events and mark the render
//!   queue dirty before the next draw.

pub mod assets;
pub mod config;
mod game;

pub use assets::GameAssets;
pub use config::{ConfigError, GameConfig, WindowConfig};
pub use game::Game;

pub fn crate_info() -> &'static str {
    "prism-game v0.1.0"
}
