use prism_common::{MaterialHandle, MeshHandle, RenderPriority};
use prism_render::{DrawMode, FrameStats};
use prism_scene::Scene;
use serde::Serialize;
use std::collections::BTreeMap;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene for the debug overlay and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Summarize the scene and the last frame drawn from it.
    pub fn summary(scene: &Scene, stats: &FrameStats, mode: DrawMode) -> SceneSummary {
        SceneSummary {
            mode,
            entity_count: scene.len(),
            animated: scene
                .entities()
                .iter()
                .filter(|e| e.animation().is_some())
                .count(),
            pending_events: scene.events().len(),
            priorities: Self::priority_histogram(scene),
            stats: *stats,
        }
    }

    /// Entity count per render priority, lowest priority first.
    pub fn priority_histogram(scene: &Scene) -> BTreeMap<RenderPriority, usize> {
        let mut histogram = BTreeMap::new();
        for entity in scene.entities() {
            *histogram.entry(entity.priority()).or_insert(0) += 1;
        }
        histogram
    }

    pub fn inspect_entity(scene: &Scene, index: usize) -> Option<EntityInfo> {
        scene.get(index).map(|entity| {
            let t = entity.transform();
            EntityInfo {
                index,
                mesh: entity.mesh(),
                material: entity.material(),
                priority: entity.priority(),
                position: t.position().to_array(),
                pitch_yaw_roll: t.pitch_yaw_roll().to_array(),
                scale: t.scale().to_array(),
                animated: entity.animation().is_some(),
            }
        })
    }
}

/// Scene and frame counters for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub mode: DrawMode,
    pub entity_count: usize,
    pub animated: usize,
    pub pending_events: usize,
    pub priorities: BTreeMap<RenderPriority, usize>,
    pub stats: FrameStats,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: mode={} entities={} animated={} draws={} vs_binds={} ps_binds={}",
            self.mode,
            self.entity_count,
            self.animated,
            self.stats.draws,
            self.stats.vertex_shader_binds,
            self.stats.pixel_shader_binds,
        )?;
        for (priority, count) in &self.priorities {
            write!(f, " {priority}:{count}")?;
        }
        Ok(())
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityInfo {
    pub index: usize,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub priority: RenderPriority,
    pub position: [f32; 3],
    pub pitch_yaw_roll: [f32; 3],
    pub scale: [f32; 3],
    pub animated: bool,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity #{} mesh={} material={} {} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.index,
            self.mesh.0,
            self.material.0,
            self.priority,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use prism_common::Transform;
    use prism_scene::{Animation, Entity};

    fn entity(priority: i32) -> Entity {
        Entity::new(MeshHandle(0), MaterialHandle(priority as u32), RenderPriority(priority))
    }

    fn scene() -> Scene {
        let mut scene = Scene::new(1);
        scene.spawn(entity(1));
        scene.spawn(entity(0).with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))));
        scene.spawn(entity(1).with_animation(Animation::Spin { rate: Vec3::Y }));
        scene
    }

    #[test]
    fn summary_empty_scene() {
        let summary = SceneInspector::summary(&Scene::new(0), &FrameStats::default(), DrawMode::Immediate);
        assert_eq!(summary.entity_count, 0);
        assert!(summary.priorities.is_empty());
    }

    #[test]
    fn summary_counts_priorities_and_animation() {
        let summary = SceneInspector::summary(&scene(), &FrameStats::default(), DrawMode::Queued);
        assert_eq!(summary.entity_count, 3);
        assert_eq!(summary.animated, 1);
        assert_eq!(summary.priorities[&RenderPriority(0)], 1);
        assert_eq!(summary.priorities[&RenderPriority(1)], 2);
    }

    #[test]
    fn inspect_entity_found() {
        let info = SceneInspector::inspect_entity(&scene(), 1).unwrap();
        assert_eq!(info.position, [1.0, 2.0, 3.0]);
        assert_eq!(info.priority, RenderPriority(0));
        assert!(!info.animated);
    }

    #[test]
    fn inspect_entity_not_found() {
        assert!(SceneInspector::inspect_entity(&scene(), 3).is_none());
    }

    #[test]
    fn summary_display() {
        let stats = FrameStats {
            draws: 3,
            vertex_shader_binds: 3,
            pixel_shader_binds: 2,
        };
        let s = SceneInspector::summary(&scene(), &stats, DrawMode::Queued).to_string();
        assert!(s.contains("mode=queued"));
        assert!(s.contains("ps_binds=2"));
        assert!(s.contains("p0:1 p1:2"));
    }
}
