use crate::input::InputState;

/// Window services consumed by the frame loop.
pub trait Platform {
    /// Processes all pending platform events without blocking.
    fn poll_events(&mut self);

    fn should_close(&self) -> bool;

    /// Makes `should_close` return `true`; the loop exits before its next iteration.
    fn request_close(&mut self);

    /// Drawable size in physical pixels.
    fn size_in_pixels(&self) -> (u32, u32);

    fn input(&self) -> &InputState;

    /// Returns the latest size change since the previous call, if any.
    fn take_resize(&mut self) -> Option<(u32, u32)>;

    /// Clears per-frame input transitions.
    fn end_input_frame(&mut self);
}
