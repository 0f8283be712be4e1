use crate::animation::Animation;
use prism_common::{MaterialHandle, MeshHandle, RenderPriority, Transform};

/// A drawable object: shared mesh and material handles plus an owned transform.
#[derive(Debug, Clone)]
pub struct Entity {
    mesh: MeshHandle,
    material: MaterialHandle,
    priority: RenderPriority,
    transform: Transform,
    animation: Option<Animation>,
}

impl Entity {
    /// `priority` is the material's priority at construction time and is
    /// fixed for the entity's lifetime.
    pub fn new(mesh: MeshHandle, material: MaterialHandle, priority: RenderPriority) -> Self {
        Self {
            mesh,
            material,
            priority,
            transform: Transform::default(),
            animation: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub fn priority(&self) -> RenderPriority {
        self.priority
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub fn animation(&self) -> Option<&Animation> {
        self.animation.as_ref()
    }

    pub fn set_animation(&mut self, animation: Option<Animation>) {
        self.animation = animation;
    }

    /// Advance this entity's animation, if any.
    pub fn animate(&mut self, dt: f32, total_time: f32) {
        if let Some(animation) = &self.animation {
            animation.apply(&mut self.transform, dt, total_time);
        }
    }
}
