use crate::context::{GraphicsContext, Vertex};
use crate::error::RenderError;
use crate::geometry::MeshData;
use prism_common::GpuMeshId;

/// Check that vertex and index data describe whole, in-range triangles.
pub fn validate_geometry(vertices: &[Vertex], indices: &[u32]) -> Result<(), RenderError> {
    if vertices.is_empty() || indices.is_empty() {
        return Err(RenderError::EmptyMesh);
    }
    if indices.len() % 3 != 0 {
        return Err(RenderError::PartialTriangle(indices.len()));
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(RenderError::IndexOutOfRange {
            index,
            vertex_count: vertices.len(),
        });
    }
    Ok(())
}

/// Immutable GPU-resident geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    name: String,
    buffers: GpuMeshId,
    vertex_count: u32,
    index_count: u32,
}

impl Mesh {
    /// Validate and upload geometry through `ctx`.
    pub fn new<C: GraphicsContext + ?Sized>(
        ctx: &mut C,
        name: impl Into<String>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self, RenderError> {
        validate_geometry(vertices, indices)?;
        let buffers = ctx.create_mesh(vertices, indices)?;
        let name = name.into();
        tracing::debug!(
            mesh = %name,
            vertices = vertices.len(),
            indices = indices.len(),
            "mesh uploaded"
        );
        Ok(Self {
            name,
            buffers,
            vertex_count: vertices.len() as u32,
            index_count: indices.len() as u32,
        })
    }

    pub fn from_data<C: GraphicsContext + ?Sized>(
        ctx: &mut C,
        name: impl Into<String>,
        data: &MeshData,
    ) -> Result<Self, RenderError> {
        Self::new(ctx, name, &data.vertices, &data.indices)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffers(&self) -> GpuMeshId {
        self.buffers
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Issue an indexed draw of the whole mesh with the currently bound state.
    pub fn draw<C: GraphicsContext + ?Sized>(&self, ctx: &mut C) -> Result<(), RenderError> {
        ctx.draw_indexed(self.buffers, self.index_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::recording::RecordingContext;

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            validate_geometry(&[], &[0, 1, 2]),
            Err(RenderError::EmptyMesh)
        ));
    }

    #[test]
    fn rejects_partial_triangle() {
        let data = geometry::plane(1.0);
        assert!(matches!(
            validate_geometry(&data.vertices, &[0, 1]),
            Err(RenderError::PartialTriangle(2))
        ));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let data = geometry::plane(1.0);
        let err = validate_geometry(&data.vertices, &[0, 1, 4]).unwrap_err();
        assert!(matches!(
            err,
            RenderError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            }
        ));
    }

    #[test]
    fn new_uploads_and_counts() {
        let mut ctx = RecordingContext::new();
        let data = geometry::cube(1.0);
        let mesh = Mesh::from_data(&mut ctx, "cube", &data).unwrap();
        assert_eq!(mesh.name(), "cube");
        assert_eq!(mesh.index_count(), 36);
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(ctx.mesh_count(), 1);
    }

    #[test]
    fn invalid_geometry_never_reaches_backend() {
        let mut ctx = RecordingContext::new();
        assert!(Mesh::new(&mut ctx, "bad", &[], &[]).is_err());
        assert_eq!(ctx.mesh_count(), 0);
    }
}
