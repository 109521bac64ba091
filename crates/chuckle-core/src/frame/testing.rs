//! Headless `Platform` and `RenderDevice` doubles for frame-loop tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::Result;
use glam::Mat4;
use image::RgbaImage;

use crate::coords::Viewport;
use crate::device::{FrameStatus, RenderDevice, SamplerHandle, SamplerSettings, TextureHandle};
use crate::error::Error;
use crate::input::InputState;
use crate::paint::Color;
use crate::quickdraw::{DrawCall, DrawTarget, Topology, Vertex, VertexSink};
use crate::window::Platform;

/// Ordered log shared between doubles and test callbacks.
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn note(journal: &Journal, entry: impl Into<String>) {
    journal.borrow_mut().push(entry.into());
}

#[derive(Debug, Default)]
pub struct MockPlatform {
    pub size: (u32, u32),
    /// Requests close once this many polls happened.
    pub close_after_polls: Option<u64>,
    pub polls: u64,
    pub resizes: VecDeque<(u32, u32)>,
    pub input_frames_ended: u64,
    closed: bool,
    input: InputState,
}

impl MockPlatform {
    pub fn new(size: (u32, u32), close_after_polls: Option<u64>) -> Self {
        Self {
            size,
            close_after_polls,
            ..Self::default()
        }
    }
}

impl Platform for MockPlatform {
    fn poll_events(&mut self) {
        self.polls += 1;
        if self.close_after_polls.is_some_and(|n| self.polls >= n) {
            self.closed = true;
        }
    }

    fn should_close(&self) -> bool {
        self.closed
    }

    fn request_close(&mut self) {
        self.closed = true;
    }

    fn size_in_pixels(&self) -> (u32, u32) {
        self.size
    }

    fn input(&self) -> &InputState {
        &self.input
    }

    fn take_resize(&mut self) -> Option<(u32, u32)> {
        let resize = self.resizes.pop_front();
        if let Some(size) = resize {
            self.size = size;
        }
        resize
    }

    fn end_input_frame(&mut self) {
        self.input_frames_ended += 1;
        self.input.end_frame();
    }
}

/// Render device that records the frame protocol instead of drawing.
pub struct MockDevice {
    pub journal: Journal,
    pub size: (u32, u32),
    /// Statuses returned by successive `begin_frame` calls; `Ready` once empty.
    pub statuses: VecDeque<FrameStatus>,
    /// Makes the named step fail during the given 1-based frame.
    pub fail_on: Option<(&'static str, u64)>,

    pub frames_begun: u64,
    pub frames_presented: u64,
    pub uploads: Vec<usize>,
    pub draws: Vec<(Topology, u32, u32)>,
    pub viewports: Vec<Viewport>,
    pub matrices: Vec<Mat4>,
    /// `(width, height, byte length)` of every created texture.
    pub textures: Vec<(u32, u32, usize)>,

    in_frame: bool,
    in_pass: bool,
    next_texture: u32,
}

impl MockDevice {
    pub fn new(journal: Journal, size: (u32, u32)) -> Self {
        Self {
            journal,
            size,
            statuses: VecDeque::new(),
            fail_on: None,
            frames_begun: 0,
            frames_presented: 0,
            uploads: Vec::new(),
            draws: Vec::new(),
            viewports: Vec::new(),
            matrices: Vec::new(),
            textures: Vec::new(),
            in_frame: false,
            in_pass: false,
            next_texture: 1,
        }
    }

    pub fn total_uploaded(&self) -> usize {
        self.uploads.iter().sum()
    }

    fn log(&self, entry: &str) {
        note(&self.journal, entry);
    }

    fn fail_if(&self, step: &'static str, frame: u64) -> Result<()> {
        if self.fail_on == Some((step, frame)) {
            anyhow::bail!("{step} failed");
        }
        Ok(())
    }
}

impl DrawTarget for MockDevice {
    fn prepare(&mut self, _calls: &[DrawCall], _vertex_count: usize) -> Result<()> {
        if !self.in_pass {
            return Err(Error::InvalidOperation("add_to_pass requires an active render pass").into());
        }
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewports.push(viewport);
    }

    fn bind_transform_projection(&mut self, matrix: &Mat4) {
        self.matrices.push(*matrix);
    }

    fn bind_texture(&mut self, _texture: TextureHandle, _sampler: SamplerHandle) {}

    fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        self.draws.push((topology, first_vertex, vertex_count));
    }
}

impl VertexSink for MockDevice {
    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.fail_if("upload", self.frames_begun)?;
        self.log("upload");
        self.uploads.push(vertices.len());
        Ok(())
    }
}

impl RenderDevice for MockDevice {
    fn begin_frame(&mut self) -> Result<FrameStatus> {
        self.fail_if("begin_frame", self.frames_begun + 1)?;
        let status = self.statuses.pop_front().unwrap_or(FrameStatus::Ready);
        if status == FrameStatus::Ready {
            self.log("begin_frame");
            self.frames_begun += 1;
            self.in_frame = true;
        } else {
            self.log("skip_frame");
        }
        Ok(status)
    }

    fn begin_pass(&mut self, _clear: Color) -> Result<()> {
        assert!(self.in_frame && !self.in_pass);
        self.fail_if("begin_pass", self.frames_begun)?;
        self.log("begin_pass");
        self.in_pass = true;
        Ok(())
    }

    fn end_pass(&mut self) -> Result<()> {
        assert!(self.in_pass);
        self.fail_if("end_pass", self.frames_begun)?;
        self.log("end_pass");
        self.in_pass = false;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        assert!(self.in_frame && !self.in_pass);
        self.fail_if("end_frame", self.frames_begun)?;
        self.log("end_frame");
        self.in_frame = false;
        Ok(())
    }

    fn present(&mut self) {
        self.log("present");
        self.frames_presented += 1;
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn size_in_pixels(&self) -> (u32, u32) {
        self.size
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle> {
        self.textures.push((width, height, rgba.len()));
        let handle = TextureHandle::from_index(self.next_texture);
        self.next_texture += 1;
        Ok(handle)
    }

    fn destroy_texture(&mut self, _texture: TextureHandle) -> Result<()> {
        Ok(())
    }

    fn create_sampler(&mut self, _settings: SamplerSettings) -> Result<SamplerHandle> {
        Ok(SamplerHandle::from_index(1))
    }

    fn read_pixels(&mut self, _x: u32, _y: u32, width: u32, height: u32) -> Result<RgbaImage> {
        Ok(RgbaImage::new(width, height))
    }
}
