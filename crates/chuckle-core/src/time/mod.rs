//! Time subsystem.
//!
//! Frame timing utilities kept independent of the window and GPU so they can
//! be driven from tests with synthetic timestamps:
//! - `FrameClock` produces per-frame delta times
//! - `FpsCounter` keeps a 100-sample moving average of the frame rate
//! - `FramePacer` caps the frame rate by sleeping out the rest of a frame

mod fps;
mod frame_clock;
mod pacing;

pub use fps::{FpsCounter, FPS_SAMPLE_COUNT};
pub use frame_clock::{FrameClock, FrameTime, DEFAULT_FRAME_DELTA};
pub use pacing::FramePacer;
