//! Platform window.
//!
//! `Platform` is what the frame loop needs from a window: event pumping,
//! close state, size and input. `WinitPlatform` implements it on top of a
//! winit event loop pumped once per frame.

mod platform;
mod settings;
mod winit_platform;

pub use platform::Platform;
pub use settings::WindowSettings;
pub use winit_platform::WinitPlatform;
