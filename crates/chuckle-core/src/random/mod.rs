//! Seedable random numbers and gradient noise.
//!
//! Both generators are plain values owned by the caller; there is no
//! process-wide instance.

mod perlin;
mod randomizer;

pub use perlin::PerlinNoise;
pub use randomizer::Randomizer;
