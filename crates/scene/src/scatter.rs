use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic placement source for batch-spawned geometry.
///
/// Backed by a ChaCha8 stream, so a given seed always produces the same
/// sequence of positions and picks on every platform.
#[derive(Debug, Clone)]
pub struct Scatter {
    rng: ChaCha8Rng,
}

impl Scatter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        self.rng.r#gen::<f32>()
    }

    /// Uniform float in `[-1, 1)`.
    pub fn next_signed(&mut self) -> f32 {
        self.rng.gen_range(-1.0..1.0)
    }

    /// Index in `0..len`. Returns 0 for an empty range.
    pub fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    /// Point inside the axis-aligned box `center +/- half_extent`.
    pub fn point_in_box(&mut self, center: Vec3, half_extent: Vec3) -> Vec3 {
        let offset = Vec3::new(self.next_signed(), self.next_signed(), self.next_signed());
        center + offset * half_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Scatter::new(42);
        let mut b = Scatter::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_f32(), b.next_f32());
            assert_eq!(a.pick(1000), b.pick(1000));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Scatter::new(1);
        let mut b = Scatter::new(2);
        let xs: Vec<f32> = (0..8).map(|_| a.next_f32()).collect();
        let ys: Vec<f32> = (0..8).map(|_| b.next_f32()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn clone_continues_the_same_stream() {
        let mut a = Scatter::new(5);
        a.next_f32();
        let mut b = a.clone();
        assert_eq!(a.next_signed(), b.next_signed());
    }

    #[test]
    fn floats_stay_in_range() {
        let mut s = Scatter::new(7);
        for _ in 0..1000 {
            let f = s.next_f32();
            assert!((0.0..1.0).contains(&f));
            let g = s.next_signed();
            assert!((-1.0..1.0).contains(&g));
        }
    }

    #[test]
    fn points_stay_in_box() {
        let mut s = Scatter::new(9);
        let center = Vec3::new(0.0, 5.0, 10.0);
        let half = Vec3::new(4.0, 1.0, 2.0);
        for _ in 0..500 {
            let p = s.point_in_box(center, half);
            let d = (p - center).abs();
            assert!(d.x <= half.x && d.y <= half.y && d.z <= half.z);
        }
    }

    #[test]
    fn pick_in_bounds() {
        let mut s = Scatter::new(3);
        for _ in 0..200 {
            assert!(s.pick(5) < 5);
        }
        assert_eq!(s.pick(0), 0);
    }
}
