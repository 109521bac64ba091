use std::f32::consts::TAU;

use glam::Vec2;

use crate::device::{SamplerHandle, TextureHandle};

use super::{IntoVertex, QuickDraw, Topology, Vertex};

/// Perimeter subdivisions used by `circle` and `line_circle`.
pub const DEFAULT_CIRCLE_SEGMENTS: u32 = 20;

/// Perimeter of a circle: `segments + 1` points, the last equal to the first.
fn circle_perimeter(center: Vec2, radius: f32, segments: u32) -> impl Iterator<Item = Vec2> {
    let step = TAU / segments as f32;
    (0..=segments).map(move |i| {
        // Wrap the final angle so the closing point is bit-identical to the first.
        let angle = (i % segments) as f32 * step;
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    })
}

impl QuickDraw {
    #[inline]
    fn solid(&self, position: Vec2) -> Vertex {
        Vertex::new(position.extend(0.0), self.color)
    }

    fn emit_solid<I>(&mut self, positions: I, topology: Topology)
    where
        I: IntoIterator<Item = Vec2>,
    {
        let color = self.color;
        self.emit(
            positions
                .into_iter()
                .map(move |p| Vertex::new(p.extend(0.0), color)),
            topology,
            TextureHandle::WHITE,
            SamplerHandle::BILINEAR,
        );
    }

    /// Filled axis-aligned rectangle.
    pub fn rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) {
        self.emit_solid(
            [
                Vec2::new(min_x, min_y),
                Vec2::new(min_x, max_y),
                Vec2::new(max_x, min_y),
                Vec2::new(max_x, max_y),
            ],
            Topology::TriangleStrip,
        );
    }

    /// Rectangle outline, clockwise on a y-down target.
    pub fn line_rect(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) {
        self.emit_solid(
            [
                Vec2::new(min_x, min_y),
                Vec2::new(max_x, min_y),
                Vec2::new(max_x, max_y),
                Vec2::new(min_x, max_y),
            ],
            Topology::LineLoop,
        );
    }

    /// Filled circle with [`DEFAULT_CIRCLE_SEGMENTS`] subdivisions.
    pub fn circle(&mut self, x: f32, y: f32, radius: f32) {
        self.circle_subdivided(x, y, radius, DEFAULT_CIRCLE_SEGMENTS);
    }

    /// Filled circle: center vertex plus `segments + 1` perimeter vertices.
    ///
    /// `segments == 0` emits nothing.
    pub fn circle_subdivided(&mut self, x: f32, y: f32, radius: f32, segments: u32) {
        if segments == 0 {
            return;
        }
        let center = Vec2::new(x, y);
        let perimeter = circle_perimeter(center, radius, segments);
        self.emit_solid(
            std::iter::once(center).chain(perimeter),
            Topology::TriangleFan,
        );
    }

    pub fn line_circle(&mut self, x: f32, y: f32, radius: f32) {
        self.line_circle_subdivided(x, y, radius, DEFAULT_CIRCLE_SEGMENTS);
    }

    /// Circle outline: the same `segments + 1` perimeter vertices, no center.
    pub fn line_circle_subdivided(&mut self, x: f32, y: f32, radius: f32, segments: u32) {
        if segments == 0 {
            return;
        }
        self.emit_solid(
            circle_perimeter(Vec2::new(x, y), radius, segments),
            Topology::LineLoop,
        );
    }

    /// Textured quad tinted with the current color.
    ///
    /// `sampler` falls back to [`SamplerHandle::BILINEAR`].
    pub fn tex(
        &mut self,
        texture: TextureHandle,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
        sampler: Option<SamplerHandle>,
    ) {
        let corners = [
            (Vec2::new(min_x, min_y), Vec2::new(0.0, 0.0)),
            (Vec2::new(min_x, max_y), Vec2::new(0.0, 1.0)),
            (Vec2::new(max_x, min_y), Vec2::new(1.0, 0.0)),
            (Vec2::new(max_x, max_y), Vec2::new(1.0, 1.0)),
        ];
        let vertices = corners.map(|(p, uv)| self.solid(p).with_tex_coord(uv));
        self.emit(
            vertices,
            Topology::TriangleStrip,
            texture,
            sampler.unwrap_or(SamplerHandle::BILINEAR),
        );
    }

    /// Connected line through `points`; `closed` joins the last point back to the first.
    pub fn line_strip<V: IntoVertex>(&mut self, points: &[V], closed: bool) {
        let topology = if closed {
            Topology::LineLoop
        } else {
            Topology::LineStrip
        };
        self.emit_points(points, topology);
    }

    /// Independent segments from consecutive point pairs.
    pub fn lines<V: IntoVertex>(&mut self, points: &[V]) {
        self.emit_points(points, Topology::Lines);
    }

    pub fn points<V: IntoVertex>(&mut self, points: &[V]) {
        self.emit_points(points, Topology::Points);
    }

    /// Filled convex polygon, fanned from the first point.
    pub fn convex_polygon<V: IntoVertex>(&mut self, points: &[V]) {
        self.emit_points(points, Topology::TriangleFan);
    }

    /// Independent triangles from consecutive point triples.
    pub fn triangles<V: IntoVertex>(&mut self, points: &[V]) {
        self.emit_points(points, Topology::Triangles);
    }

    /// Filled squares of half-width `radius`, one draw call for all of them.
    pub fn rects(&mut self, centers: &[Vec2], radius: f32) {
        let r = radius;
        self.emit_solid(
            centers.iter().flat_map(|&c| {
                let tl = c + Vec2::new(-r, -r);
                let tr = c + Vec2::new(r, -r);
                let bl = c + Vec2::new(-r, r);
                let br = c + Vec2::new(r, r);
                [tl, tr, bl, tr, br, bl]
            }),
            Topology::Triangles,
        );
    }

    /// Square outlines of half-width `radius`, one draw call for all of them.
    pub fn line_rects(&mut self, centers: &[Vec2], radius: f32) {
        let r = radius;
        self.emit_solid(
            centers.iter().flat_map(|&c| {
                let tl = c + Vec2::new(-r, -r);
                let tr = c + Vec2::new(r, -r);
                let bl = c + Vec2::new(-r, r);
                let br = c + Vec2::new(r, r);
                [tl, tr, tr, br, br, bl, bl, tl]
            }),
            Topology::Lines,
        );
    }

    /// Caller-built vertices with full control over topology and bindings.
    pub fn draw_vertices(
        &mut self,
        vertices: &[Vertex],
        topology: Topology,
        texture: Option<TextureHandle>,
        sampler: Option<SamplerHandle>,
    ) {
        self.emit(
            vertices.iter().copied(),
            topology,
            texture.unwrap_or(TextureHandle::WHITE),
            sampler.unwrap_or(SamplerHandle::BILINEAR),
        );
    }
}
