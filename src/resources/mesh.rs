use wgpu::PrimitiveTopology;

use crate::renderer::device::{IndexBufferHandle, VertexBufferHandle};

/// Input assembly for one draw: vertex buffer, optional index buffer and
/// primitive topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertex_buffer: VertexBufferHandle,
    pub vertex_count: u32,
    pub index_buffer: Option<(IndexBufferHandle, u32)>,
    pub primitive: PrimitiveTopology,
}

impl Mesh {
    #[must_use]
    pub fn new(vertex_buffer: VertexBufferHandle, vertex_count: u32) -> Self {
        Self {
            vertex_buffer,
            vertex_count,
            index_buffer: None,
            primitive: PrimitiveTopology::TriangleList,
        }
    }

    #[must_use]
    pub fn with_indices(mut self, buffer: IndexBufferHandle, count: u32) -> Self {
        self.index_buffer = Some((buffer, count));
        self
    }

    #[must_use]
    pub fn with_primitive(mut self, primitive: PrimitiveTopology) -> Self {
        self.primitive = primitive;
        self
    }

    /// Element count of a draw: index count when indexed, else vertex count.
    #[inline]
    #[must_use]
    pub fn draw_count(&self) -> u32 {
        self.index_buffer
            .map_or(self.vertex_count, |(_, count)| count)
    }
}
