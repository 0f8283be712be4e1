//! Scene: the entity set the renderer draws.
//!
//! # Invariants
//! - An entity's render priority never changes after construction.
//! - Entity-set mutations are recorded as [`SceneEvent`]s so derived state
//!   (the render queue) can be invalidated.
//! - Removal clamps at zero entities.

pub mod animation;
pub mod entity;
pub mod scatter;
pub mod scene;

pub use animation::Animation;
pub use entity::Entity;
pub use scatter::Scatter;
pub use scene::{Scene, SceneEvent};

pub fn crate_info() -> &'static str {
    "prism-scene v0.1.0"
}
