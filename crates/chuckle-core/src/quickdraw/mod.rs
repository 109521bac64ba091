//! QuickDraw: immediate-mode 2D batching.
//!
//! Shape emitters append vertices to one shared geometry buffer and record a
//! `DrawCall` per shape. Each call snapshots `projection * transform` at
//! emission time, so later transform changes never affect it.
//!
//! A frame drives QuickDraw in two steps:
//! - `add_to_pass` records every queued call into the active render pass and
//!   empties the queue (may run several times per frame).
//! - `flush` uploads the accumulated geometry and empties the buffer. Flushing
//!   while calls are still queued is an error.

mod batch;
mod gpu;
mod shapes;
mod transform;
mod vertex;

pub use batch::{expand_indices, DrawCall, DrawTarget, Topology, VertexSink};
pub(crate) use gpu::QuickDrawGpu;
pub use shapes::DEFAULT_CIRCLE_SEGMENTS;
pub use transform::{affine2_to_mat4, ortho_projection, TransformState};
pub use vertex::{IntoVertex, Vertex};

use glam::{Affine2, Mat4, Vec3};

use crate::coords::Viewport;
use crate::paint::Color;

/// Batched 2D draw-call accumulator.
#[derive(Debug, Default)]
pub struct QuickDraw {
    transform: TransformState,
    viewport: Viewport,
    color: Color,

    geometry: Vec<Vertex>,
    draw_calls: Vec<DrawCall>,
}

impl QuickDraw {
    pub fn new() -> Self {
        Self::default()
    }

    // Fill color

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Sets the fill color applied to subsequently emitted vertices.
    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    // Viewport

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Viewport applied to the pass before each draw at submission time.
    ///
    /// Parts outside the render target are clipped; the visible part keeps
    /// the mapping of the whole rectangle.
    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.viewport = Viewport::new(x, y, width, height);
    }

    /// Full-target viewport plus a pixel-space projection (origin top-left, +Y down).
    pub fn fit_to_size(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::from_size(width, height);
        self.transform.set_projection(ortho_projection(width, height));
    }

    // Transform stack

    #[inline]
    pub fn transform_state(&self) -> &TransformState {
        &self.transform
    }

    #[inline]
    pub fn transform(&self) -> &Mat4 {
        self.transform.transform()
    }

    #[inline]
    pub fn projection(&self) -> &Mat4 {
        self.transform.projection()
    }

    pub fn set_transform(&mut self, m: Mat4) {
        self.transform.set_transform(m);
    }

    pub fn set_projection(&mut self, m: Mat4) {
        self.transform.set_projection(m);
    }

    pub fn apply_transform(&mut self, m: Mat4) {
        self.transform.apply_transform(m);
    }

    pub fn set_transform_2d(&mut self, a: Affine2) {
        self.transform.set_transform(affine2_to_mat4(a));
    }

    pub fn set_projection_2d(&mut self, a: Affine2) {
        self.transform.set_projection(affine2_to_mat4(a));
    }

    pub fn apply_transform_2d(&mut self, a: Affine2) {
        self.transform.apply_transform(affine2_to_mat4(a));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.apply_transform(Mat4::from_translation(Vec3::new(x, y, 0.0)));
    }

    /// Rotation about +Z; clockwise on screen with the default y-down projection.
    pub fn rotate(&mut self, radians: f32) {
        self.apply_transform(Mat4::from_rotation_z(radians));
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.apply_transform(Mat4::from_scale(Vec3::new(sx, sy, 1.0)));
    }

    pub fn push_transform(&mut self) {
        self.transform.push_transform();
    }

    pub fn pop_transform(&mut self) {
        self.transform.pop_transform();
    }

    pub fn push_projection(&mut self) {
        self.transform.push_projection();
    }

    pub fn pop_projection(&mut self) {
        self.transform.pop_projection();
    }

    /// `projection * transform` as it would be captured by the next emitter.
    pub fn transform_projection(&mut self) -> Mat4 {
        self.transform.transform_projection()
    }

    // Batch state

    #[inline]
    pub fn geometry(&self) -> &[Vertex] {
        &self.geometry
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.geometry.len()
    }

    #[inline]
    pub fn pending_draw_calls(&self) -> usize {
        self.draw_calls.len()
    }

    #[inline]
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    #[inline]
    pub fn has_pending_draws(&self) -> bool {
        !self.draw_calls.is_empty()
    }

    /// Drops queued calls and buffered geometry without submitting them.
    pub fn clear(&mut self) {
        self.draw_calls.clear();
        self.geometry.clear();
    }
}
