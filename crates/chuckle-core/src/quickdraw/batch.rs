use anyhow::Result;
use glam::Mat4;

use crate::coords::Viewport;
use crate::device::{SamplerHandle, TextureHandle};
use crate::error::Error;

use super::{IntoVertex, QuickDraw, Vertex};

/// Primitive assembly mode of a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Topology {
    Triangles,
    TriangleStrip,
    TriangleFan,
    Lines,
    LineStrip,
    /// Line strip closed back to its first vertex.
    LineLoop,
    Points,
}

impl Topology {
    /// Fans and loops have no native GPU topology; they are drawn through a
    /// generated index list instead.
    #[inline]
    pub fn needs_indices(self) -> bool {
        matches!(self, Topology::TriangleFan | Topology::LineLoop)
    }

    pub(crate) fn gpu_topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Topology::Triangles | Topology::TriangleFan => wgpu::PrimitiveTopology::TriangleList,
            Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Topology::Lines => wgpu::PrimitiveTopology::LineList,
            Topology::LineStrip | Topology::LineLoop => wgpu::PrimitiveTopology::LineStrip,
            Topology::Points => wgpu::PrimitiveTopology::PointList,
        }
    }

    /// Number of generated indices for `vertex_count` vertices (0 for non-indexed).
    pub fn index_count(self, vertex_count: u32) -> u32 {
        match self {
            Topology::TriangleFan if vertex_count >= 3 => 3 * (vertex_count - 2),
            Topology::LineLoop if vertex_count >= 2 => vertex_count + 1,
            _ => 0,
        }
    }
}

/// Appends the index list that emulates `topology` over the vertex range
/// `first..first + count`.
///
/// Fans become a triangle list pivoting on `first`; loops become a strip that
/// returns to `first`. Other topologies append nothing.
pub fn expand_indices(topology: Topology, first: u32, count: u32, out: &mut Vec<u32>) {
    out.reserve(topology.index_count(count) as usize);
    match topology {
        Topology::TriangleFan if count >= 3 => {
            for i in 1..count - 1 {
                out.extend_from_slice(&[first, first + i, first + i + 1]);
            }
        }
        Topology::LineLoop if count >= 2 => {
            out.extend(first..first + count);
            out.push(first);
        }
        _ => {}
    }
}

/// One recorded shape: a contiguous geometry range plus its render state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub vertex_offset: usize,
    pub vertex_count: usize,
    pub topology: Topology,
    pub texture: TextureHandle,
    pub sampler: SamplerHandle,
    /// `projection * transform` captured when the shape was emitted.
    pub transform_projection: Mat4,
}

/// Render-pass side of QuickDraw submission.
pub trait DrawTarget {
    /// Called once per `add_to_pass` before any other call, with every call
    /// about to be recorded and the current geometry length.
    fn prepare(&mut self, calls: &[DrawCall], vertex_count: usize) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport);

    fn bind_transform_projection(&mut self, matrix: &Mat4);

    fn bind_texture(&mut self, texture: TextureHandle, sampler: SamplerHandle);

    /// Draws `vertex_count` vertices starting at `first_vertex` of the
    /// geometry uploaded by the next `VertexSink::upload_vertices`.
    fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32);
}

/// Receives the frame's geometry in one upload.
pub trait VertexSink {
    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<()>;
}

impl QuickDraw {
    /// Appends `vertices` and records a draw call over them.
    ///
    /// Empty input records nothing.
    pub(crate) fn emit<I>(
        &mut self,
        vertices: I,
        topology: Topology,
        texture: TextureHandle,
        sampler: SamplerHandle,
    ) where
        I: IntoIterator<Item = Vertex>,
    {
        let vertex_offset = self.geometry.len();
        self.geometry.extend(vertices);
        let vertex_count = self.geometry.len() - vertex_offset;
        if vertex_count == 0 {
            return;
        }

        let transform_projection = self.transform.transform_projection();
        self.draw_calls.push(DrawCall {
            vertex_offset,
            vertex_count,
            topology,
            texture,
            sampler,
            transform_projection,
        });
    }

    /// Untextured emission of caller-supplied points in the current color.
    pub(crate) fn emit_points<V: IntoVertex>(&mut self, points: &[V], topology: Topology) {
        let color = self.color;
        self.emit(
            points.iter().map(|p| p.into_vertex(color)),
            topology,
            TextureHandle::WHITE,
            SamplerHandle::BILINEAR,
        );
    }

    /// Records every queued draw call into `pass`, then empties the queue.
    ///
    /// Per call: viewport, transform-projection, texture (only when it changes
    /// from the previous call), then the draw. Geometry stays buffered for
    /// [`flush`](Self::flush).
    pub fn add_to_pass<T>(&mut self, pass: &mut T) -> Result<()>
    where
        T: DrawTarget + ?Sized,
    {
        if self.draw_calls.is_empty() {
            return Ok(());
        }

        pass.prepare(&self.draw_calls, self.geometry.len())?;

        let mut bound: Option<(TextureHandle, SamplerHandle)> = None;
        for call in &self.draw_calls {
            pass.set_viewport(self.viewport);
            pass.bind_transform_projection(&call.transform_projection);

            let binding = (call.texture, call.sampler);
            if bound != Some(binding) {
                pass.bind_texture(call.texture, call.sampler);
                bound = Some(binding);
            }

            pass.draw(
                call.topology,
                call.vertex_offset as u32,
                call.vertex_count as u32,
            );
        }

        log::trace!("quickdraw: recorded {} draw calls", self.draw_calls.len());
        self.draw_calls.clear();
        Ok(())
    }

    /// Uploads the buffered geometry and empties it.
    ///
    /// Fails with `Error::InvalidOperation` if draw calls are still queued.
    pub fn flush<S>(&mut self, sink: &mut S) -> Result<()>
    where
        S: VertexSink + ?Sized,
    {
        if !self.draw_calls.is_empty() {
            return Err(Error::InvalidOperation(
                "flush called with queued draw calls; call add_to_pass first",
            )
            .into());
        }

        sink.upload_vertices(&self.geometry)?;
        self.geometry.clear();
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Everything a `DrawTarget`/`VertexSink` was asked to do, in order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum PassOp {
        Prepare { calls: usize, vertices: usize },
        Viewport(Viewport),
        Matrix(Mat4),
        Texture(TextureHandle, SamplerHandle),
        Draw(Topology, u32, u32),
    }

    #[derive(Debug, Default)]
    pub struct RecordingTarget {
        pub ops: Vec<PassOp>,
        pub uploads: Vec<Vec<Vertex>>,
        pub fail_prepare: bool,
    }

    impl RecordingTarget {
        pub fn draws(&self) -> Vec<(Topology, u32, u32)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    PassOp::Draw(t, first, count) => Some((*t, *first, *count)),
                    _ => None,
                })
                .collect()
        }

        pub fn texture_binds(&self) -> usize {
            self.ops
                .iter()
                .filter(|op| matches!(op, PassOp::Texture(..)))
                .count()
        }
    }

    impl DrawTarget for RecordingTarget {
        fn prepare(&mut self, calls: &[DrawCall], vertex_count: usize) -> Result<()> {
            if self.fail_prepare {
                anyhow::bail!("prepare failed");
            }
            self.ops.push(PassOp::Prepare {
                calls: calls.len(),
                vertices: vertex_count,
            });
            Ok(())
        }

        fn set_viewport(&mut self, viewport: Viewport) {
            self.ops.push(PassOp::Viewport(viewport));
        }

        fn bind_transform_projection(&mut self, matrix: &Mat4) {
            self.ops.push(PassOp::Matrix(*matrix));
        }

        fn bind_texture(&mut self, texture: TextureHandle, sampler: SamplerHandle) {
            self.ops.push(PassOp::Texture(texture, sampler));
        }

        fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32) {
            self.ops.push(PassOp::Draw(topology, first_vertex, vertex_count));
        }
    }

    impl VertexSink for RecordingTarget {
        fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
            self.uploads.push(vertices.to_vec());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{PassOp, RecordingTarget};
    use super::*;
    use glam::{Vec2, Vec3};

    fn tri() -> [Vec2; 3] {
        [Vec2::ZERO, Vec2::X, Vec2::Y]
    }

    #[test]
    fn fan_indices_pivot_on_first_vertex() {
        let mut out = Vec::new();
        expand_indices(Topology::TriangleFan, 10, 5, &mut out);
        assert_eq!(out, vec![10, 11, 12, 10, 12, 13, 10, 13, 14]);
        assert_eq!(out.len() as u32, Topology::TriangleFan.index_count(5));
    }

    #[test]
    fn loop_indices_close_back_to_start() {
        let mut out = vec![99];
        expand_indices(Topology::LineLoop, 4, 3, &mut out);
        assert_eq!(out, vec![99, 4, 5, 6, 4]);
    }

    #[test]
    fn degenerate_index_ranges_append_nothing() {
        let mut out = Vec::new();
        expand_indices(Topology::TriangleFan, 0, 2, &mut out);
        expand_indices(Topology::LineLoop, 0, 1, &mut out);
        expand_indices(Topology::Triangles, 0, 6, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn draw_call_snapshots_transform_at_emission() {
        let mut qd = QuickDraw::new();
        let a = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        qd.set_transform(a);
        qd.triangles(&tri());
        let captured = qd.draw_calls()[0].transform_projection;

        qd.set_transform(Mat4::from_scale(Vec3::splat(3.0)));
        assert_eq!(qd.draw_calls()[0].transform_projection, captured);
        assert_eq!(captured, *qd.projection() * a);
    }

    #[test]
    fn geometry_ranges_are_contiguous() {
        let mut qd = QuickDraw::new();
        qd.triangles(&tri());
        qd.lines(&[Vec2::ZERO, Vec2::ONE]);
        qd.points(&[Vec2::ONE]);

        let calls = qd.draw_calls();
        assert_eq!(calls.len(), 3);
        let mut expected_offset = 0;
        for call in calls {
            assert_eq!(call.vertex_offset, expected_offset);
            expected_offset += call.vertex_count;
        }
        assert_eq!(expected_offset, qd.geometry().len());
    }

    #[test]
    fn add_to_pass_records_calls_in_order_and_keeps_geometry() {
        let mut qd = QuickDraw::new();
        qd.set_viewport(0.0, 0.0, 640.0, 480.0);
        qd.triangles(&tri());
        qd.lines(&[Vec2::ZERO, Vec2::ONE]);

        let mut target = RecordingTarget::default();
        qd.add_to_pass(&mut target).unwrap();

        assert_eq!(
            target.draws(),
            vec![(Topology::Triangles, 0, 3), (Topology::Lines, 3, 2)]
        );
        assert_eq!(
            target.ops[0],
            PassOp::Prepare {
                calls: 2,
                vertices: 5
            }
        );
        assert_eq!(
            target.ops[1],
            PassOp::Viewport(Viewport::new(0.0, 0.0, 640.0, 480.0))
        );
        assert!(!qd.has_pending_draws());
        assert_eq!(qd.geometry().len(), 5);
    }

    #[test]
    fn texture_binding_only_changes_on_switch() {
        let mut qd = QuickDraw::new();
        qd.triangles(&tri());
        qd.triangles(&tri());
        qd.tex(TextureHandle::from_index(3), 0.0, 0.0, 1.0, 1.0, None);
        qd.triangles(&tri());

        let mut target = RecordingTarget::default();
        qd.add_to_pass(&mut target).unwrap();

        // white, textured, white
        assert_eq!(target.texture_binds(), 3);
        assert_eq!(target.draws().len(), 4);
    }

    #[test]
    fn add_to_pass_twice_submits_each_call_once() {
        let mut qd = QuickDraw::new();
        qd.triangles(&tri());
        let mut target = RecordingTarget::default();
        qd.add_to_pass(&mut target).unwrap();

        qd.points(&[Vec2::ONE]);
        qd.add_to_pass(&mut target).unwrap();

        assert_eq!(
            target.draws(),
            vec![(Topology::Triangles, 0, 3), (Topology::Points, 3, 1)]
        );
    }

    #[test]
    fn empty_queue_does_not_touch_the_pass() {
        let mut qd = QuickDraw::new();
        let mut target = RecordingTarget {
            fail_prepare: true,
            ..Default::default()
        };
        qd.add_to_pass(&mut target).unwrap();
        assert!(target.ops.is_empty());
    }

    #[test]
    fn flush_with_queued_calls_is_invalid() {
        let mut qd = QuickDraw::new();
        qd.triangles(&tri());

        let mut sink = RecordingTarget::default();
        let err = qd.flush(&mut sink).unwrap_err();
        let err = err.downcast_ref::<Error>().unwrap();
        assert!(err.is_invalid_operation());
        assert!(sink.uploads.is_empty());
        assert_eq!(qd.geometry().len(), 3);
    }

    #[test]
    fn flush_uploads_everything_then_clears() {
        let mut qd = QuickDraw::new();
        qd.triangles(&tri());
        qd.lines(&[Vec2::ZERO, Vec2::ONE]);

        let mut target = RecordingTarget::default();
        qd.add_to_pass(&mut target).unwrap();
        qd.flush(&mut target).unwrap();

        assert_eq!(target.uploads.len(), 1);
        assert_eq!(target.uploads[0].len(), 5);
        assert!(qd.geometry().is_empty());
    }

    #[test]
    fn failed_prepare_keeps_queue() {
        let mut qd = QuickDraw::new();
        qd.triangles(&tri());
        let mut target = RecordingTarget {
            fail_prepare: true,
            ..Default::default()
        };
        assert!(qd.add_to_pass(&mut target).is_err());
        assert!(qd.has_pending_draws());
    }

    #[test]
    fn empty_input_records_no_call() {
        let mut qd = QuickDraw::new();
        qd.triangles::<Vec2>(&[]);
        qd.lines::<Vec2>(&[]);
        assert!(qd.draw_calls().is_empty());
        assert!(qd.geometry().is_empty());
    }
}
