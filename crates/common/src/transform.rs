use glam::{EulerRot, Mat4, Quat, Vec3};

/// Spatial transform: position, Euler rotation (pitch, yaw, roll) and scale,
/// with a lazily rebuilt world matrix.
///
/// Every mutator marks the transform dirty. [`Transform::world_matrix`]
/// recomposes `translation * rotation * scale` only when dirty, so polling it
/// several times per frame without mutation costs nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    /// x = pitch, y = yaw, z = roll, in radians. Unbounded.
    rotation: Vec3,
    scale: Vec3,
    world: Mat4,
    dirty: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            world: Mat4::IDENTITY,
            dirty: false,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        let mut t = Self::default();
        t.set_position(position);
        t
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    /// Overwrite the rotation. `pitch_yaw_roll` is in radians.
    pub fn set_rotation(&mut self, pitch_yaw_roll: Vec3) {
        self.rotation = pitch_yaw_roll;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    /// Move along world axes.
    pub fn move_absolute(&mut self, offset: Vec3) {
        self.position += offset;
        self.dirty = true;
    }

    /// Move along the transform's local axes.
    pub fn move_relative(&mut self, offset: Vec3) {
        self.position += self.orientation() * offset;
        self.dirty = true;
    }

    pub fn rotate(&mut self, pitch_yaw_roll: Vec3) {
        self.rotation += pitch_yaw_roll;
        self.dirty = true;
    }

    /// Multiply the current scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale *= factor;
        self.dirty = true;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pitch_yaw_roll(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rotation as a quaternion: roll about Z, then pitch about X, then yaw about Y.
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }

    /// Local +Z in world space.
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::Z
    }

    /// Local +X in world space.
    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    /// Local +Y in world space.
    pub fn up(&self) -> Vec3 {
        self.orientation() * Vec3::Y
    }

    /// World matrix, rebuilt only if a mutator ran since the last call.
    pub fn world_matrix(&mut self) -> Mat4 {
        if self.dirty {
            self.world = Mat4::from_translation(self.position)
                * Mat4::from_quat(self.orientation())
                * Mat4::from_scale(self.scale);
            self.dirty = false;
        }
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn default_is_identity_and_clean() {
        let mut t = Transform::default();
        assert!(!t.is_dirty());
        assert_eq!(t.world_matrix(), Mat4::IDENTITY);
        assert_eq!(t.scale(), Vec3::ONE);
    }

    #[test]
    fn mutators_mark_dirty() {
        let mut t = Transform::new();
        t.set_position(Vec3::X);
        assert!(t.is_dirty());
        t.world_matrix();
        assert!(!t.is_dirty());

        t.rotate(Vec3::new(0.1, 0.0, 0.0));
        assert!(t.is_dirty());
        t.world_matrix();
        t.scale_by(Vec3::splat(2.0));
        assert!(t.is_dirty());
        t.world_matrix();
        t.move_relative(Vec3::Z);
        assert!(t.is_dirty());
    }

    #[test]
    fn repeated_reads_are_bit_identical() {
        let mut t = Transform::new();
        t.set_position(Vec3::new(1.0, 2.0, 3.0));
        t.set_rotation(Vec3::new(0.3, 1.1, -0.4));
        let a = t.world_matrix();
        let b = t.world_matrix();
        assert_eq!(a.to_cols_array(), b.to_cols_array());
        assert!(!t.is_dirty());
    }

    #[test]
    fn world_matrix_uses_final_values() {
        let mut interleaved = Transform::new();
        interleaved.move_absolute(Vec3::new(1.0, 0.0, 0.0));
        interleaved.world_matrix();
        interleaved.rotate(Vec3::new(0.0, 0.5, 0.0));
        interleaved.world_matrix();
        interleaved.world_matrix();
        interleaved.scale_by(Vec3::new(2.0, 3.0, 4.0));
        interleaved.move_absolute(Vec3::new(0.0, -1.0, 0.0));

        let expected = Mat4::from_translation(Vec3::new(1.0, -1.0, 0.0))
            * Mat4::from_quat(Quat::from_rotation_y(0.5))
            * Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        assert!(interleaved.world_matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn translation_then_scale_composition() {
        let mut t = Transform::new();
        t.move_absolute(Vec3::new(1.0, 0.0, 0.0));
        t.scale_by(Vec3::splat(2.0));
        let m = t.world_matrix();
        // Scale applies in local space, translation last.
        assert!(approx(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 0.0, 0.0)));
        assert!(approx(m.transform_point3(Vec3::X), Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn translation_uses_each_axis() {
        let mut t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let m = t.world_matrix();
        assert!(approx(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn yaw_turns_forward_toward_x() {
        let mut t = Transform::new();
        t.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        assert!(approx(t.forward(), Vec3::X));
        assert!(approx(t.right(), -Vec3::Z));
        assert!(approx(t.up(), Vec3::Y));
    }

    #[test]
    fn move_relative_follows_orientation() {
        let mut t = Transform::new();
        t.set_rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        t.move_relative(Vec3::new(0.0, 0.0, 2.0));
        assert!(approx(t.position(), Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn rotation_is_unbounded() {
        let mut t = Transform::new();
        for _ in 0..100 {
            t.rotate(Vec3::new(1.0, 1.0, 1.0));
        }
        assert_eq!(t.pitch_yaw_roll(), Vec3::splat(100.0));
    }

    #[test]
    fn scale_by_multiplies() {
        let mut t = Transform::new();
        t.set_scale(Vec3::new(2.0, 2.0, 2.0));
        t.scale_by(Vec3::new(0.5, 2.0, 3.0));
        assert_eq!(t.scale(), Vec3::new(1.0, 4.0, 6.0));
    }
}
