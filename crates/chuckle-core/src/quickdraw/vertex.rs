use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::paint::Color;

/// A single batched vertex.
///
/// Layout matches the QuickDraw shader inputs and is uploaded verbatim.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x4, // color
        2 => Float32x2  // tex_coord
    ];

    #[inline]
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            tex_coord: [0.0, 0.0],
        }
    }

    #[inline]
    pub fn with_tex_coord(mut self, uv: Vec2) -> Self {
        self.tex_coord = uv.to_array();
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn tex_coord(&self) -> Vec2 {
        Vec2::from_array(self.tex_coord)
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Inputs accepted by the pass-through emitters (`lines`, `points`, ...).
///
/// Positions pick up the current fill color; a full `Vertex` is kept as is.
pub trait IntoVertex: Copy {
    fn into_vertex(self, color: Color) -> Vertex;
}

impl IntoVertex for Vec2 {
    #[inline]
    fn into_vertex(self, color: Color) -> Vertex {
        Vertex::new(self.extend(0.0), color)
    }
}

impl IntoVertex for Vec3 {
    #[inline]
    fn into_vertex(self, color: Color) -> Vertex {
        Vertex::new(self, color)
    }
}

impl IntoVertex for Vertex {
    #[inline]
    fn into_vertex(self, _color: Color) -> Vertex {
        self
    }
}
