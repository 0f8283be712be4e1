use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const MAX_DIRECTIONAL_LIGHTS: usize = 3;
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    /// Direction the light travels in.
    pub direction: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub position: Vec3,
    /// Distance at which the light falls off to zero.
    pub range: f32,
}

/// Lights pushed once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lighting {
    directional: Vec<DirectionalLight>,
    point: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            directional: vec![DirectionalLight {
                ambient: Vec3::splat(0.1),
                diffuse: Vec3::splat(0.9),
                direction: Vec3::new(1.0, -1.0, 0.5),
            }],
            point: Vec::new(),
        }
    }
}

impl Lighting {
    pub fn empty() -> Self {
        Self {
            directional: Vec::new(),
            point: Vec::new(),
        }
    }

    /// Returns false when all directional slots are taken.
    pub fn add_directional(&mut self, light: DirectionalLight) -> bool {
        if self.directional.len() >= MAX_DIRECTIONAL_LIGHTS {
            return false;
        }
        self.directional.push(light);
        true
    }

    /// Returns false when all point slots are taken.
    pub fn add_point(&mut self, light: PointLight) -> bool {
        if self.point.len() >= MAX_POINT_LIGHTS {
            return false;
        }
        self.point.push(light);
        true
    }

    pub fn directional(&self) -> &[DirectionalLight] {
        &self.directional
    }

    pub fn point(&self) -> &[PointLight] {
        &self.point
    }

    /// Drop lights beyond the slot limits, e.g. after deserializing.
    pub fn clamped(mut self) -> Self {
        if self.directional.len() > MAX_DIRECTIONAL_LIGHTS
            || self.point.len() > MAX_POINT_LIGHTS
        {
            tracing::warn!(
                directional = self.directional.len(),
                point = self.point.len(),
                "too many lights; extra lights ignored"
            );
        }
        self.directional.truncate(MAX_DIRECTIONAL_LIGHTS);
        self.point.truncate(MAX_POINT_LIGHTS);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sun() -> DirectionalLight {
        DirectionalLight {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            direction: Vec3::NEG_Y,
        }
    }

    #[test]
    fn directional_slots_are_limited() {
        let mut l = Lighting::empty();
        for _ in 0..MAX_DIRECTIONAL_LIGHTS {
            assert!(l.add_directional(sun()));
        }
        assert!(!l.add_directional(sun()));
        assert_eq!(l.directional().len(), MAX_DIRECTIONAL_LIGHTS);
    }

    #[test]
    fn clamped_truncates() {
        let mut l = Lighting::empty();
        l.directional = vec![sun(); 5];
        let l = l.clamped();
        assert_eq!(l.directional().len(), MAX_DIRECTIONAL_LIGHTS);
    }

    #[test]
    fn default_has_one_key_light() {
        let l = Lighting::default();
        assert_eq!(l.directional().len(), 1);
        assert!(l.point().is_empty());
    }
}
