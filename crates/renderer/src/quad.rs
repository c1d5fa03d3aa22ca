//! Full-screen quad geometry and a CPU mirror of the vertex stage.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 2],
}

/// Corners of the quad in triangle-strip order.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [-1.0, -1.0] },
    QuadVertex { pos: [1.0, -1.0] },
    QuadVertex { pos: [-1.0, 1.0] },
    QuadVertex { pos: [1.0, 1.0] },
];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

pub(crate) fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

/// Clip-space position written by the vertex stage for `pos`.
pub fn clip_position(pos: [f32; 2]) -> [f32; 4] {
    [pos[0], pos[1], 0.0, 1.0]
}

/// Texture coordinate handed to the fragment stage for `pos`.
pub fn texcoord(pos: [f32; 2]) -> [f32; 2] {
    [(pos[0] + 1.0) / 2.0, (pos[1] + 1.0) / 2.0]
}
