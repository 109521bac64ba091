//! Chuckle core crate.
//!
//! Window lifecycle, per-frame rendering and the batched 2D quick-draw layer
//! used by chuckle applications.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod frame;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod quickdraw;
pub mod random;
pub mod paths;

mod error;

pub use error::Error;
pub use frame::{FrameCtx, RenderWindow};
pub use quickdraw::QuickDraw;
pub use window::WindowSettings;
