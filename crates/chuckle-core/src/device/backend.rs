use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

use crate::paint::Color;
use crate::quickdraw::{DrawTarget, VertexSink};

use super::{SamplerHandle, SamplerSettings, TextureHandle};

/// Outcome of `RenderDevice::begin_frame`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameStatus {
    /// A frame was acquired; the full frame protocol must follow.
    Ready,
    /// Transient surface condition; nothing was acquired and the iteration is skipped.
    Skipped,
}

/// The render device driven by the frame loop.
///
/// Per frame: `begin_frame`, `begin_pass`, QuickDraw submission through the
/// `DrawTarget`/`VertexSink` supertraits, `end_pass`, `end_frame`, `present`.
pub trait RenderDevice: DrawTarget + VertexSink {
    fn begin_frame(&mut self) -> Result<FrameStatus>;

    /// Opens the default render pass, cleared to `clear`.
    fn begin_pass(&mut self, clear: Color) -> Result<()>;

    fn end_pass(&mut self) -> Result<()>;

    /// Submits the recorded frame. The image stays readable until `present`.
    fn end_frame(&mut self) -> Result<()>;

    fn present(&mut self);

    fn resize(&mut self, width: u32, height: u32);

    fn size_in_pixels(&self) -> (u32, u32);

    /// Creates a texture from tightly packed RGBA8 pixels.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle>;

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<()>;

    fn create_sampler(&mut self, settings: SamplerSettings) -> Result<SamplerHandle>;

    /// Reads back a region of the last submitted frame.
    fn read_pixels(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<RgbaImage>;

    /// Loads an image file (any format enabled on the `image` crate) as a texture.
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle> {
        let image = image::open(path)
            .with_context(|| format!("failed to load texture {}", path.display()))?
            .to_rgba8();
        self.create_texture(image.width(), image.height(), image.as_raw())
    }

    /// The whole last submitted frame.
    fn frame_image(&mut self) -> Result<RgbaImage> {
        let (width, height) = self.size_in_pixels();
        self.read_pixels(0, 0, width, height)
    }

    /// Writes the last submitted frame to `path`; the format follows the extension.
    fn save_frame(&mut self, path: &Path) -> Result<()> {
        self.frame_image()?
            .save(path)
            .with_context(|| format!("failed to save frame to {}", path.display()))?;
        log::info!("saved frame to {}", path.display());
        Ok(())
    }
}
