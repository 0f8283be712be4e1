use crate::entity::Entity;
use crate::scatter::Scatter;
use glam::Vec3;
use prism_common::Transform;
use serde::{Deserialize, Serialize};

/// Record of an entity-set mutation.
///
/// Consumers that cache anything derived from the entity list (the render
/// queue) drain these to know when to rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneEvent {
    Added { count: usize },
    Removed { count: usize },
}

/// The ordered set of entities drawn each frame.
#[derive(Debug, Clone)]
pub struct Scene {
    entities: Vec<Entity>,
    scatter: Scatter,
    center: Vec3,
    half_extent: Vec3,
    event_log: Vec<SceneEvent>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Scene {
    /// Empty scene; `seed` drives placement of batch-added geometry.
    pub fn new(seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            scatter: Scatter::new(seed),
            center: Vec3::new(0.0, 0.0, 20.0),
            half_extent: Vec3::new(15.0, 8.0, 15.0),
            event_log: Vec::new(),
        }
    }

    /// Region batch-added geometry is scattered into.
    pub fn with_spawn_region(mut self, center: Vec3, half_extent: Vec3) -> Self {
        self.center = center;
        self.half_extent = half_extent;
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Mutable access to the entities for in-place updates such as moving
    /// transforms. No [`SceneEvent`] is recorded, so a caller that reorders
    /// the slice or replaces an entity must mark any cached render queue
    /// dirty itself.
    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.entities.get_mut(index)
    }

    /// Append one entity and return its index.
    pub fn spawn(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.event_log.push(SceneEvent::Added { count: 1 });
        self.entities.len() - 1
    }

    /// Append `count` copies of prototypes picked from `palette`, each placed
    /// at a scattered position with a random yaw on top of the prototype's
    /// own rotation. Returns how many were added.
    pub fn add_geometry(&mut self, count: usize, palette: &[Entity]) -> usize {
        if count == 0 {
            return 0;
        }
        if palette.is_empty() {
            tracing::warn!("add_geometry called with an empty palette");
            return 0;
        }

        self.entities.reserve(count);
        for _ in 0..count {
            let prototype = &palette[self.scatter.pick(palette.len())];
            let mut transform = Transform::from_position(
                self.scatter.point_in_box(self.center, self.half_extent),
            );
            let yaw = self.scatter.next_signed() * std::f32::consts::PI;
            transform.set_rotation(
                prototype.transform().pitch_yaw_roll() + Vec3::new(0.0, yaw, 0.0),
            );
            transform.set_scale(prototype.transform().scale());
            let mut entity = prototype.clone();
            entity.set_animation(
                prototype
                    .animation()
                    .map(|a| a.anchored_at(transform.position())),
            );
            self.entities.push(entity.with_transform(transform));
        }

        self.event_log.push(SceneEvent::Added { count });
        tracing::info!(added = count, total = self.entities.len(), "geometry added");
        count
    }

    /// Remove up to `count` entities from the end. Clamps at zero and returns
    /// how many were actually removed.
    pub fn remove_geometry(&mut self, count: usize) -> usize {
        let removed = count.min(self.entities.len());
        if removed == 0 {
            return 0;
        }
        self.entities.truncate(self.entities.len() - removed);
        self.event_log.push(SceneEvent::Removed { count: removed });
        tracing::info!(removed, total = self.entities.len(), "geometry removed");
        removed
    }

    pub fn clear(&mut self) -> usize {
        self.remove_geometry(self.entities.len())
    }

    /// Advance every entity's animation.
    pub fn animate(&mut self, dt: f32, total_time: f32) {
        for entity in &mut self.entities {
            entity.animate(dt, total_time);
        }
    }

    /// Drain and return pending mutation events.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use prism_common::{MaterialHandle, MeshHandle, RenderPriority};

    fn palette() -> Vec<Entity> {
        vec![
            Entity::new(MeshHandle(0), MaterialHandle(0), RenderPriority(0)),
            Entity::new(MeshHandle(1), MaterialHandle(1), RenderPriority(1)),
        ]
    }

    #[test]
    fn starts_empty() {
        let scene = Scene::new(1);
        assert!(scene.is_empty());
        assert!(scene.events().is_empty());
    }

    #[test]
    fn add_then_remove_more_clamps_at_zero() {
        let mut scene = Scene::new(1);
        assert_eq!(scene.add_geometry(50, &palette()), 50);
        assert_eq!(scene.len(), 50);
        assert_eq!(scene.remove_geometry(60), 50);
        assert_eq!(scene.len(), 0);
        assert_eq!(scene.remove_geometry(10), 0);
        assert_eq!(scene.len(), 0);
    }

    #[test]
    fn mutations_are_logged() {
        let mut scene = Scene::new(1);
        scene.add_geometry(3, &palette());
        scene.remove_geometry(5);
        scene.remove_geometry(5);
        let events = scene.drain_events();
        assert_eq!(
            events,
            vec![
                SceneEvent::Added { count: 3 },
                SceneEvent::Removed { count: 3 },
            ]
        );
        assert!(scene.events().is_empty());
    }

    #[test]
    fn empty_palette_adds_nothing() {
        let mut scene = Scene::new(1);
        assert_eq!(scene.add_geometry(10, &[]), 0);
        assert!(scene.events().is_empty());
    }

    #[test]
    fn added_geometry_lands_in_region() {
        let center = Vec3::new(0.0, 0.0, 10.0);
        let half = Vec3::splat(2.0);
        let mut scene = Scene::new(5).with_spawn_region(center, half);
        scene.add_geometry(100, &palette());
        for e in scene.entities() {
            let d = (e.transform().position() - center).abs();
            assert!(d.x <= 2.0 && d.y <= 2.0 && d.z <= 2.0);
        }
    }

    #[test]
    fn added_geometry_copies_prototype_handles() {
        let mut scene = Scene::new(11);
        let palette = palette();
        scene.add_geometry(40, &palette);
        for e in scene.entities() {
            assert!(palette.iter().any(|p| p.mesh() == e.mesh()
                && p.material() == e.material()
                && p.priority() == e.priority()));
        }
    }

    #[test]
    fn added_bobbers_bob_in_place() {
        let bobber = Entity::new(MeshHandle(0), MaterialHandle(0), RenderPriority(0))
            .with_animation(Animation::Bob {
                origin: Vec3::ZERO,
                axis: Vec3::Y,
                amplitude: 1.0,
                frequency: 1.0,
            });
        let mut scene = Scene::new(3);
        scene.add_geometry(5, &[bobber]);
        let spawned: Vec<Vec3> = scene.entities().iter().map(|e| e.transform().position()).collect();
        scene.animate(0.016, 0.0);
        for (e, p) in scene.entities().iter().zip(spawned) {
            assert!((e.transform().position() - p).length() < 1e-5);
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = Scene::new(99);
        let mut b = Scene::new(99);
        a.add_geometry(20, &palette());
        b.add_geometry(20, &palette());
        for (x, y) in a.entities().iter().zip(b.entities()) {
            assert_eq!(x.transform().position(), y.transform().position());
            assert_eq!(x.material(), y.material());
        }
    }

    #[test]
    fn added_geometry_keeps_prototype_pitch_and_roll() {
        let mut tilted = Transform::new();
        tilted.set_rotation(Vec3::new(0.5, 0.25, -0.3));
        tilted.set_scale(Vec3::splat(2.0));
        let prototype = Entity::new(MeshHandle(0), MaterialHandle(0), RenderPriority(0))
            .with_transform(tilted);

        let mut scene = Scene::new(21);
        scene.add_geometry(30, &[prototype]);
        let yaws: Vec<f32> = scene
            .entities()
            .iter()
            .map(|e| e.transform().pitch_yaw_roll().y)
            .collect();
        for e in scene.entities() {
            let pyr = e.transform().pitch_yaw_roll();
            assert!((pyr.x - 0.5).abs() < 1e-6);
            assert!((pyr.z + 0.3).abs() < 1e-6);
            assert!((pyr.y - 0.25).abs() <= std::f32::consts::PI + 1e-5);
            assert_eq!(e.transform().scale(), Vec3::splat(2.0));
        }
        assert!(yaws.windows(2).any(|w| w[0] != w[1]));
    }

    #[test]
    fn slice_mutation_records_no_event() {
        let mut scene = Scene::new(1);
        scene.spawn(Entity::new(MeshHandle(0), MaterialHandle(0), RenderPriority(0)));
        scene.spawn(Entity::new(MeshHandle(1), MaterialHandle(1), RenderPriority(1)));
        scene.drain_events();

        scene.entities_mut().swap(0, 1);
        assert!(scene.events().is_empty());
        assert_eq!(scene.get(0).map(|e| e.priority()), Some(RenderPriority(1)));
    }

    #[test]
    fn removal_keeps_earliest_entities() {
        let mut scene = Scene::new(1);
        let first = scene.spawn(Entity::new(MeshHandle(7), MaterialHandle(7), RenderPriority(7)));
        scene.add_geometry(10, &palette());
        scene.remove_geometry(10);
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(first).map(|e| e.mesh()), Some(MeshHandle(7)));
    }

    #[test]
    fn animate_moves_animated_entities_only() {
        let mut scene = Scene::new(1);
        let still = scene.spawn(Entity::new(MeshHandle(0), MaterialHandle(0), RenderPriority(0)));
        let spinning = scene.spawn(
            Entity::new(MeshHandle(0), MaterialHandle(0), RenderPriority(0)).with_animation(
                Animation::Spin {
                    rate: Vec3::new(0.0, 1.0, 0.0),
                },
            ),
        );
        scene.animate(1.0, 1.0);
        assert_eq!(scene.get(still).map(|e| e.transform().is_dirty()), Some(false));
        assert_eq!(
            scene.get(spinning).map(|e| e.transform().pitch_yaw_roll().y),
            Some(1.0)
        );
    }
}
