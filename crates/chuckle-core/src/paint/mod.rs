//! Fill color model used by QuickDraw vertices.

pub mod color;

pub use color::Color;
