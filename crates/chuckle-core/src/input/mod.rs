//! Input subsystem.
//!
//! The platform layer translates native events into `InputEvent`s and applies
//! them to an `InputState`. Frame participants read the state before the user
//! draw callback runs; per-frame deltas are cleared after the frame.

mod state;

pub use state::{InputEvent, InputState, MouseButton};
pub use winit::keyboard::KeyCode;
