use glam::Vec3;
use prism_common::Transform;
use serde::{Deserialize, Serialize};

/// Time-driven motion attached to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Animation {
    /// Rotate by `rate` (pitch, yaw, roll radians per second).
    Spin { rate: Vec3 },
    /// Oscillate around `origin` along `axis`.
    Bob {
        origin: Vec3,
        axis: Vec3,
        amplitude: f32,
        frequency: f32,
    },
    /// Breathe the scale around `base`.
    Pulse {
        base: Vec3,
        amplitude: f32,
        frequency: f32,
    },
}

impl Animation {
    /// The same motion centred on `position`. Only `Bob` has an anchor.
    pub fn anchored_at(self, position: Vec3) -> Self {
        match self {
            Animation::Bob {
                axis,
                amplitude,
                frequency,
                ..
            } => Animation::Bob {
                origin: position,
                axis,
                amplitude,
                frequency,
            },
            other => other,
        }
    }

    pub fn apply(&self, transform: &mut Transform, dt: f32, total_time: f32) {
        match *self {
            Animation::Spin { rate } => transform.rotate(rate * dt),
            Animation::Bob {
                origin,
                axis,
                amplitude,
                frequency,
            } => {
                let offset = axis * amplitude * (total_time * frequency).sin();
                transform.set_position(origin + offset);
            }
            Animation::Pulse {
                base,
                amplitude,
                frequency,
            } => {
                let factor = 1.0 + amplitude * (total_time * frequency).sin();
                transform.set_scale(base * factor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn spin_accumulates_with_dt() {
        let mut t = Transform::new();
        let spin = Animation::Spin {
            rate: Vec3::new(0.0, 2.0, 0.0),
        };
        spin.apply(&mut t, 0.5, 0.0);
        spin.apply(&mut t, 0.25, 0.0);
        assert!((t.pitch_yaw_roll().y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn bob_is_absolute_in_time() {
        let mut t = Transform::new();
        let bob = Animation::Bob {
            origin: Vec3::new(1.0, 0.0, 0.0),
            axis: Vec3::Y,
            amplitude: 2.0,
            frequency: 1.0,
        };
        bob.apply(&mut t, 0.016, FRAC_PI_2);
        assert!((t.position() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
        bob.apply(&mut t, 0.016, 0.0);
        assert!((t.position() - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn anchoring_moves_bob_only() {
        let bob = Animation::Bob {
            origin: Vec3::ZERO,
            axis: Vec3::Y,
            amplitude: 1.0,
            frequency: 1.0,
        };
        match bob.anchored_at(Vec3::X) {
            Animation::Bob { origin, .. } => assert_eq!(origin, Vec3::X),
            other => panic!("unexpected {other:?}"),
        }
        let spin = Animation::Spin { rate: Vec3::Y };
        assert_eq!(spin.anchored_at(Vec3::X), spin);
    }

    #[test]
    fn pulse_scales_base() {
        let mut t = Transform::new();
        let pulse = Animation::Pulse {
            base: Vec3::splat(2.0),
            amplitude: 0.5,
            frequency: 1.0,
        };
        pulse.apply(&mut t, 0.0, FRAC_PI_2);
        assert!((t.scale() - Vec3::splat(3.0)).length() < 1e-5);
        assert!(t.is_dirty());
    }
}
