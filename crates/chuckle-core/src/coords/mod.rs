//! Coordinate types shared by QuickDraw and the render device.
//!
//! QuickDraw geometry is expressed in whatever space the current
//! transform/projection maps to clip space. The default projection set by
//! `QuickDraw::fit_to_size` is pixel space: origin top-left, +X right, +Y down.

mod viewport;

pub use viewport::Viewport;
