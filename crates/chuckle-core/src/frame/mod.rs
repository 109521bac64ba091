//! Render-window frame loop.
//!
//! `RenderWindow` owns a `Platform`, a `RenderDevice` and a `QuickDraw` and
//! drives them once per iteration: timing, events, user drawing, overlay
//! participants, submission, presentation and pacing.

mod ctx;
mod metrics;
mod participant;
mod render_window;
mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use ctx::{FrameCtx, FrameFinishedCtx, FrameInfo};
pub use metrics::MetricsOverlay;
pub use participant::FrameParticipant;
pub use render_window::{DrawFunction, FrameFinishedFunction, RenderWindow};
pub use state::LoopState;
