use glam::{Mat4, Vec3};

/// Viewport rectangle in physical pixels.
///
/// Applied to the render pass before every QuickDraw draw call.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Full-target viewport anchored at the origin.
    #[inline]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Clamps the viewport to a `width` x `height` target.
    ///
    /// Returns `None` when nothing of the viewport remains inside the target.
    pub fn clamped_to(self, width: u32, height: u32) -> Option<Self> {
        let (tw, th) = (width as f32, height as f32);
        let x0 = self.x.clamp(0.0, tw);
        let y0 = self.y.clamp(0.0, th);
        let x1 = (self.x + self.width).clamp(0.0, tw);
        let y1 = (self.y + self.height).clamp(0.0, th);

        if x1 - x0 <= 0.0 || y1 - y0 <= 0.0 {
            None
        } else {
            Some(Self::new(x0, y0, x1 - x0, y1 - y0))
        }
    }

    /// Clamps to the target and returns the clip-space correction that keeps
    /// geometry where the unclamped viewport would have placed it.
    ///
    /// The correction is applied after the projection: `correction * tp`.
    pub fn clip_to_target(self, width: u32, height: u32) -> Option<(Self, Mat4)> {
        let clipped = self.clamped_to(width, height)?;

        let sx = self.width / clipped.width;
        let sy = self.height / clipped.height;
        // NDC +Y is up while pixel +Y is down.
        let tx = (2.0 * (self.x - clipped.x) + self.width) / clipped.width - 1.0;
        let ty = 1.0 - (2.0 * (self.y - clipped.y) + self.height) / clipped.height;

        let correction = Mat4::from_translation(Vec3::new(tx, ty, 0.0))
            * Mat4::from_scale(Vec3::new(sx, sy, 1.0));
        Some((clipped, correction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::Vec2;

    /// Pixel hit by an NDC point drawn through `viewport`.
    fn pixel(viewport: Viewport, ndc: Vec2) -> Vec2 {
        Vec2::new(
            viewport.x + (ndc.x + 1.0) * 0.5 * viewport.width,
            viewport.y + (1.0 - ndc.y) * 0.5 * viewport.height,
        )
    }

    #[test]
    fn clip_inside_needs_no_correction() {
        let v = Viewport::new(10.0, 10.0, 100.0, 50.0);
        let (clipped, correction) = v.clip_to_target(800, 600).unwrap();
        assert_eq!(clipped, v);
        assert!(correction.abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn clip_correction_keeps_pixels_in_place() {
        for v in [
            Viewport::new(-10.0, 0.0, 100.0, 700.0),
            Viewport::new(700.0, -40.0, 200.0, 100.0),
            Viewport::new(-50.0, -50.0, 900.0, 700.0),
        ] {
            let (clipped, correction) = v.clip_to_target(800, 600).unwrap();
            for ndc in [
                Vec2::new(-1.0, 1.0),
                Vec2::new(1.0, -1.0),
                Vec2::new(0.25, -0.5),
                Vec2::ZERO,
            ] {
                let corrected = correction.transform_point3(ndc.extend(0.0)).truncate();
                let expected = pixel(v, ndc);
                let actual = pixel(clipped, corrected);
                assert_relative_eq!(actual.x, expected.x, epsilon = 1e-3);
                assert_relative_eq!(actual.y, expected.y, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn clip_outside_returns_none() {
        assert!(Viewport::new(-200.0, 0.0, 100.0, 100.0).clip_to_target(800, 600).is_none());
    }

    #[test]
    fn clamp_inside_is_identity() {
        let v = Viewport::new(10.0, 10.0, 100.0, 50.0);
        assert_eq!(v.clamped_to(800, 600), Some(v));
    }

    #[test]
    fn clamp_trims_overhang() {
        let v = Viewport::new(-10.0, 0.0, 100.0, 700.0);
        assert_eq!(v.clamped_to(800, 600), Some(Viewport::new(0.0, 0.0, 90.0, 600.0)));
    }

    #[test]
    fn clamp_outside_returns_none() {
        let v = Viewport::new(900.0, 0.0, 100.0, 100.0);
        assert!(v.clamped_to(800, 600).is_none());
    }

    #[test]
    fn zero_size_is_invalid() {
        assert!(!Viewport::from_size(0.0, 10.0).is_valid());
        assert!(Viewport::from_size(1.0, 1.0).is_valid());
    }
}
