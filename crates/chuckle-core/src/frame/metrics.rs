use anyhow::Result;
use glam::{Mat4, Vec2};

use crate::paint::Color;
use crate::quickdraw::{ortho_projection, QuickDraw};

use super::{FrameInfo, FrameParticipant};

/// Screen-space FPS graph drawn on top of the frame.
///
/// Shows the sample history as a line strip over a translucent panel and,
/// when a target is set, a horizontal marker at the target rate.
#[derive(Debug, Clone)]
pub struct MetricsOverlay {
    /// Top-left corner in pixels.
    pub origin: Vec2,
    pub size: Vec2,
    pub background: Color,
    pub border: Color,
    pub graph: Color,
    pub target_marker: Color,
    /// Lowest value of the graph's vertical scale.
    pub min_scale_fps: f64,
}

impl Default for MetricsOverlay {
    fn default() -> Self {
        Self {
            origin: Vec2::new(8.0, 8.0),
            size: Vec2::new(200.0, 60.0),
            background: Color::rgba(0.0, 0.0, 0.0, 0.6),
            border: Color::gray(0.5),
            graph: Color::GREEN,
            target_marker: Color::rgba(1.0, 0.8, 0.0, 0.8),
            min_scale_fps: 60.0,
        }
    }
}

impl MetricsOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// FPS value mapped to the top edge of the panel.
    fn scale_fps(&self, info: &FrameInfo<'_>) -> f64 {
        let peak = info
            .fps
            .samples()
            .chain(info.target_fps)
            .fold(self.min_scale_fps, f64::max);
        peak * 1.1
    }

    fn y_for(&self, fps: f64, scale: f64) -> f32 {
        let t = (fps / scale).clamp(0.0, 1.0) as f32;
        self.origin.y + self.size.y * (1.0 - t)
    }
}

impl FrameParticipant for MetricsOverlay {
    fn name(&self) -> &str {
        "metrics"
    }

    fn finalize_frame(&mut self, info: &FrameInfo<'_>, quick_draw: &mut QuickDraw) -> Result<()> {
        let (w, h) = info.size;
        if w == 0 || h == 0 {
            return Ok(());
        }

        let color = quick_draw.color();
        quick_draw.push_transform();
        quick_draw.push_projection();
        quick_draw.set_transform(Mat4::IDENTITY);
        quick_draw.set_projection(ortho_projection(w as f32, h as f32));

        let min = self.origin;
        let max = self.origin + self.size;

        quick_draw.set_color(self.background);
        quick_draw.rect(min.x, min.y, max.x, max.y);
        quick_draw.set_color(self.border);
        quick_draw.line_rect(min.x, min.y, max.x, max.y);

        let scale = self.scale_fps(info);
        let count = crate::time::FPS_SAMPLE_COUNT;
        let step = self.size.x / (count - 1) as f32;
        let history: Vec<Vec2> = info
            .fps
            .samples()
            .enumerate()
            .map(|(i, fps)| Vec2::new(min.x + i as f32 * step, self.y_for(fps, scale)))
            .collect();
        quick_draw.set_color(self.graph);
        quick_draw.line_strip(&history, false);

        if let Some(target) = info.target_fps {
            let y = self.y_for(target, scale);
            quick_draw.set_color(self.target_marker);
            quick_draw.lines(&[Vec2::new(min.x, y), Vec2::new(max.x, y)]);
        }

        quick_draw.set_color(color);
        quick_draw.pop_projection();
        quick_draw.pop_transform();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputState;
    use crate::quickdraw::Topology;
    use crate::time::{FpsCounter, FPS_SAMPLE_COUNT};

    fn info<'a>(input: &'a InputState, fps: &'a FpsCounter, target: Option<f64>) -> FrameInfo<'a> {
        FrameInfo {
            dt: 1.0 / 60.0,
            frame_index: 3,
            size: (800, 600),
            input,
            fps,
            target_fps: target,
        }
    }

    #[test]
    fn draws_panel_graph_and_target_marker() {
        let input = InputState::default();
        let mut fps = FpsCounter::new();
        fps.push_sample(60.0);
        let mut qd = QuickDraw::new();

        MetricsOverlay::new()
            .finalize_frame(&info(&input, &fps, Some(30.0)), &mut qd)
            .unwrap();

        let topologies: Vec<Topology> = qd.draw_calls().iter().map(|c| c.topology).collect();
        assert_eq!(
            topologies,
            vec![
                Topology::TriangleStrip,
                Topology::LineLoop,
                Topology::LineStrip,
                Topology::Lines,
            ]
        );
        assert_eq!(qd.draw_calls()[2].vertex_count, FPS_SAMPLE_COUNT);
    }

    #[test]
    fn no_target_no_marker() {
        let input = InputState::default();
        let fps = FpsCounter::new();
        let mut qd = QuickDraw::new();
        MetricsOverlay::new()
            .finalize_frame(&info(&input, &fps, None), &mut qd)
            .unwrap();
        assert_eq!(qd.pending_draw_calls(), 3);
    }

    #[test]
    fn restores_user_state() {
        let input = InputState::default();
        let fps = FpsCounter::new();
        let mut qd = QuickDraw::new();
        let transform = Mat4::from_scale(glam::Vec3::splat(4.0));
        qd.set_transform(transform);
        qd.set_color(Color::RED);

        MetricsOverlay::new()
            .finalize_frame(&info(&input, &fps, None), &mut qd)
            .unwrap();

        assert_eq!(*qd.transform(), transform);
        assert_eq!(*qd.projection(), Mat4::IDENTITY);
        assert_eq!(qd.color(), Color::RED);
        assert_eq!(qd.transform_state().transform_depth(), 0);
    }

    #[test]
    fn graph_stays_inside_panel() {
        let input = InputState::default();
        let mut fps = FpsCounter::new();
        for _ in 0..10 {
            fps.push_sample(1000.0);
        }
        let overlay = MetricsOverlay::new();
        let mut qd = QuickDraw::new();
        overlay
            .clone()
            .finalize_frame(&info(&input, &fps, None), &mut qd)
            .unwrap();

        let graph = qd.draw_calls()[2];
        let top = overlay.origin.y;
        let bottom = overlay.origin.y + overlay.size.y;
        for v in &qd.geometry()[graph.vertex_offset..graph.vertex_offset + graph.vertex_count] {
            assert!(v.position[1] >= top && v.position[1] <= bottom);
        }
    }
}
