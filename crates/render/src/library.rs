use crate::error::RenderError;
use crate::material::Material;
use crate::mesh::Mesh;
use prism_common::{MaterialHandle, MeshHandle};
use prism_scene::Entity;

/// Arena of meshes and materials addressed by handle.
///
/// Entities hold handles into this library instead of references, so entity
/// lifetime is independent of asset lifetime. Assets are never removed, which
/// keeps every issued handle valid.
#[derive(Debug, Clone, Default)]
pub struct AssetLibrary {
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() as u32 - 1)
    }

    /// Register a material. Queued rendering binds one pixel shader per
    /// priority run, so a priority shared with a different pixel shader is
    /// logged.
    pub fn add_material(&mut self, material: Material) -> MaterialHandle {
        if let Some(other) = self.materials.iter().find(|m| {
            m.priority() == material.priority() && m.pixel_shader() != material.pixel_shader()
        }) {
            tracing::warn!(
                material = material.name(),
                other = other.name(),
                priority = %material.priority(),
                "materials share a priority but not a pixel shader"
            );
        }
        self.materials.push(material);
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Result<&Mesh, RenderError> {
        self.meshes
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownMesh(handle))
    }

    pub fn material(&self, handle: MaterialHandle) -> Result<&Material, RenderError> {
        self.materials
            .get(handle.0 as usize)
            .ok_or(RenderError::UnknownMaterial(handle))
    }

    /// Build an entity, copying the material's priority into it.
    pub fn entity(&self, mesh: MeshHandle, material: MaterialHandle) -> Result<Entity, RenderError> {
        self.mesh(mesh)?;
        let priority = self.material(material)?.priority();
        Ok(Entity::new(mesh, material, priority))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshHandle(i as u32), m))
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialHandle(i as u32), m))
    }
}
