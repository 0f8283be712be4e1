//! Input: explicit per-frame snapshots of keyboard and mouse state.
//!
//! # Invariants
//! - Core code never queries the platform for input; it reads a snapshot.
//! - A snapshot is plain data and can be built by hand in tests.

pub mod snapshot;

pub use snapshot::{InputSnapshot, Key};

pub fn crate_info() -> &'static str {
    "prism-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
