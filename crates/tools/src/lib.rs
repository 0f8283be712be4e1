//! Developer tooling: scene inspector and frame timing.
//!
//! # Invariants
//! - Tools only read scene state; nothing here mutates entities.

mod inspector;
mod timing;

pub use inspector::{EntityInfo, SceneInspector, SceneSummary};
pub use timing::FrameTimer;

pub fn crate_info() -> &'static str {
    "prism-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
