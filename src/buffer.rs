use glium::{
    backend::Facade, index::PrimitiveType, uniforms::Uniforms, DrawParameters, IndexBuffer,
    Surface, VertexBuffer,
};

use crate::{
    error::RenderError,
    geometry::{self, Vertex},
    shader::Pipeline,
};

/// Vertex and index data uploaded to the GPU once. Released on drop.
pub struct GeometryBuffer {
    vertices: VertexBuffer<Vertex>,
    indices: IndexBuffer<u32>,
}

impl GeometryBuffer {
    /// Validates `indices` against `vertices` before anything touches the GPU, since
    /// nothing is checked at draw time.
    pub fn new<F: Facade + ?Sized>(
        facade: &F,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self, RenderError> {
        geometry::validate_indices(indices, vertices.len())?;

        log::debug!(
            "uploading geometry: {} vertices, {} indices",
            vertices.len(),
            indices.len()
        );
        let vertices = VertexBuffer::new(facade, vertices)
            .map_err(|err| RenderError::ResourceCreation(format!("vertex buffer: {err:?}")))?;
        let indices = IndexBuffer::new(facade, PrimitiveType::TrianglesList, indices)
            .map_err(|err| RenderError::ResourceCreation(format!("index buffer: {err:?}")))?;

        Ok(Self { vertices, indices })
    }

    pub fn cube<F: Facade + ?Sized>(facade: &F) -> Result<Self, RenderError> {
        Self::new(facade, &geometry::cube_vertices(), &geometry::cube_indices())
    }

    /// Indexed triangle draw with whatever program and uniforms the caller selected.
    pub fn draw<S: Surface + ?Sized, U: Uniforms>(
        &self,
        surface: &mut S,
        pipeline: &Pipeline,
        uniforms: &U,
        params: &DrawParameters<'_>,
    ) -> Result<(), RenderError> {
        surface.draw(
            &self.vertices,
            &self.indices,
            pipeline.program(),
            uniforms,
            params,
        )?;
        Ok(())
    }
}
