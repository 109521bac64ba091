use crate::input::InputState;
use crate::quickdraw::QuickDraw;
use crate::time::FpsCounter;

/// Read-only frame facts shared with frame participants.
#[derive(Debug, Copy, Clone)]
pub struct FrameInfo<'a> {
    /// Seconds since the previous iteration.
    pub dt: f64,
    pub frame_index: u64,
    /// Drawable size in physical pixels.
    pub size: (u32, u32),
    pub input: &'a InputState,
    pub fps: &'a FpsCounter,
    pub target_fps: Option<f64>,
}

/// Per-frame context passed to the draw function.
pub struct FrameCtx<'a, D> {
    /// Seconds since the previous iteration.
    pub dt: f64,
    pub frame_index: u64,
    /// Drawable size in physical pixels.
    pub size: (u32, u32),
    /// Moving-average frame rate.
    pub fps: f64,
    pub input: &'a InputState,
    pub quick_draw: &'a mut QuickDraw,
    /// The render device, for resource creation.
    pub device: &'a mut D,

    close_requested: bool,
}

impl<'a, D> FrameCtx<'a, D> {
    pub(crate) fn new(
        info: &FrameInfo<'a>,
        quick_draw: &'a mut QuickDraw,
        device: &'a mut D,
    ) -> Self {
        Self {
            dt: info.dt,
            frame_index: info.frame_index,
            size: info.size,
            fps: info.fps.average(),
            input: info.input,
            quick_draw,
            device,
            close_requested: false,
        }
    }

    /// Ends the loop after the current frame has been presented.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    #[inline]
    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested
    }
}

/// Context passed to the frame-finished callback.
///
/// Runs after the frame was submitted and before it is presented, so the
/// device can still read it back (`save_frame`).
pub struct FrameFinishedCtx<'a, D> {
    pub dt: f64,
    pub frame_index: u64,
    pub device: &'a mut D,
}
