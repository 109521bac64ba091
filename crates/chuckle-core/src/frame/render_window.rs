use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;

use crate::device::{FrameStatus, RenderDevice, WgpuDevice};
use crate::error::Error;
use crate::paint::Color;
use crate::quickdraw::QuickDraw;
use crate::time::{FpsCounter, FrameClock, FramePacer};
use crate::window::{Platform, WindowSettings, WinitPlatform};

use super::{FrameCtx, FrameFinishedCtx, FrameInfo, FrameParticipant, LoopState, MetricsOverlay};

/// User drawing callback, invoked once per rendered frame.
pub type DrawFunction<D> = Box<dyn FnMut(&mut FrameCtx<'_, D>) -> Result<()>>;

/// Callback invoked after a frame was submitted and before it is presented.
pub type FrameFinishedFunction<D> = Box<dyn FnMut(&mut FrameFinishedCtx<'_, D>) -> Result<()>>;

/// A window with a blocking frame loop.
///
/// Owns the platform window, the render device and a `QuickDraw` batch.
/// `run` drives frames until the window closes, the draw function asks to
/// close, or a step fails.
pub struct RenderWindow<P: Platform = WinitPlatform, D: RenderDevice = WgpuDevice> {
    platform: P,
    device: D,
    quick_draw: QuickDraw,

    draw_fn: Option<DrawFunction<D>>,
    frame_finished_fn: Option<FrameFinishedFunction<D>>,
    participants: Vec<Box<dyn FrameParticipant>>,
    metrics: MetricsOverlay,
    show_metrics: bool,

    clock: FrameClock,
    fps: FpsCounter,
    pacer: FramePacer,
    frame_count: u64,

    clear_color: Color,
    state: LoopState,
}

impl RenderWindow<WinitPlatform, WgpuDevice> {
    /// Opens a native window and initializes the GPU for it.
    pub fn open(settings: WindowSettings) -> Result<Self> {
        let (platform, window) = WinitPlatform::open(&settings)?;
        let device = WgpuDevice::new(window, settings.gpu_init())?;
        Ok(Self::from_parts(platform, device, &settings))
    }
}

impl<P: Platform, D: RenderDevice> RenderWindow<P, D> {
    /// Assembles a window from an already opened platform and device.
    pub fn from_parts(platform: P, device: D, settings: &WindowSettings) -> Self {
        let mut quick_draw = QuickDraw::new();
        let (width, height) = device.size_in_pixels();
        quick_draw.fit_to_size(width as f32, height as f32);

        Self {
            platform,
            device,
            quick_draw,
            draw_fn: None,
            frame_finished_fn: None,
            participants: Vec::new(),
            metrics: MetricsOverlay::default(),
            show_metrics: settings.show_metrics,
            clock: FrameClock::new(),
            fps: FpsCounter::new(),
            pacer: FramePacer::new(settings.target_fps),
            frame_count: 0,
            clear_color: settings.clear_color,
            state: LoopState::NotOpened,
        }
    }

    // ── callbacks ───────────────────────────────────────────────────────

    pub fn set_draw_function<F>(&mut self, draw: F)
    where
        F: FnMut(&mut FrameCtx<'_, D>) -> Result<()> + 'static,
    {
        self.draw_fn = Some(Box::new(draw));
    }

    pub fn set_frame_finished_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&mut FrameFinishedCtx<'_, D>) -> Result<()> + 'static,
    {
        self.frame_finished_fn = Some(Box::new(callback));
    }

    /// Adds an overlay that begins and finalizes every frame, in insertion order.
    pub fn add_participant(&mut self, participant: impl FrameParticipant + 'static) {
        self.participants.push(Box::new(participant));
    }

    // ── pacing and metrics ──────────────────────────────────────────────

    pub fn set_target_fps(&mut self, fps: f64) {
        self.pacer.set_target_fps(fps);
    }

    pub fn remove_target_fps(&mut self) {
        self.pacer.remove_target_fps();
    }

    pub fn target_fps(&self) -> Option<f64> {
        self.pacer.target_fps()
    }

    /// Moving-average frame rate over the last 100 frames.
    pub fn fps(&self) -> f64 {
        self.fps.average()
    }

    pub fn fps_counter(&self) -> &FpsCounter {
        &self.fps
    }

    /// Number of frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn set_showing_window_metrics(&mut self, show: bool) {
        self.show_metrics = show;
    }

    pub fn toggle_showing_window_metrics(&mut self) {
        self.show_metrics = !self.show_metrics;
    }

    pub fn is_showing_window_metrics(&self) -> bool {
        self.show_metrics
    }

    pub fn metrics_overlay_mut(&mut self) -> &mut MetricsOverlay {
        &mut self.metrics
    }

    // ── accessors ───────────────────────────────────────────────────────

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn quick_draw(&self) -> &QuickDraw {
        &self.quick_draw
    }

    pub fn quick_draw_mut(&mut self) -> &mut QuickDraw {
        &mut self.quick_draw
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    /// Stops the loop before its next iteration.
    pub fn request_close(&mut self) {
        self.platform.request_close();
    }

    /// The last submitted frame. Only available from the frame-finished callback
    /// through its device, or between frames on devices that keep the image.
    pub fn frame_image(&mut self) -> Result<RgbaImage> {
        self.device.frame_image()
    }

    pub fn save_frame(&mut self, path: &Path) -> Result<()> {
        self.device.save_frame(path)
    }

    // ── loop ────────────────────────────────────────────────────────────

    /// Runs frames until the window closes.
    ///
    /// Fails without iterating when no draw function is set, and when called
    /// on a window whose loop already ran. The first failing step ends the
    /// loop and its error is returned.
    pub fn run(&mut self) -> Result<()> {
        match self.state {
            LoopState::NotOpened => {}
            LoopState::Running | LoopState::Closing => {
                return Err(Error::InvalidOperation("the frame loop is already running").into());
            }
            LoopState::Closed => {
                return Err(Error::InvalidOperation("the window is closed").into());
            }
        }
        if self.draw_fn.is_none() {
            return Err(Error::InvalidOperation("attempting to run with no draw function set").into());
        }

        self.state = LoopState::Running;
        log::debug!("frame loop started");

        let mut result = Ok(());
        while !self.platform.should_close() {
            if let Err(e) = self.run_frame() {
                result = Err(e);
                break;
            }
        }

        self.state = LoopState::Closing;
        match &result {
            Ok(()) => log::debug!("frame loop finished after {} frames", self.frame_count),
            Err(e) => log::error!("frame loop aborted: {e:#}"),
        }
        self.quick_draw.clear();
        self.state = LoopState::Closed;

        result
    }

    fn run_frame(&mut self) -> Result<()> {
        // Split borrows so the frame context can hold several fields at once.
        let Self {
            platform,
            device,
            quick_draw,
            draw_fn,
            frame_finished_fn,
            participants,
            metrics,
            show_metrics,
            clock,
            fps,
            pacer,
            frame_count,
            clear_color,
            ..
        } = self;

        let ft = clock.tick();

        platform.poll_events();
        if let Some((width, height)) = platform.take_resize() {
            if width > 0 && height > 0 {
                device.resize(width, height);
                quick_draw.fit_to_size(width as f32, height as f32);
            }
        }

        if device.begin_frame()? == FrameStatus::Skipped {
            log::trace!("frame {} skipped", ft.frame_index);
            platform.end_input_frame();
            pacer.pace(ft.now);
            return Ok(());
        }

        let info = FrameInfo {
            dt: ft.dt,
            frame_index: *frame_count,
            size: device.size_in_pixels(),
            input: platform.input(),
            fps: &*fps,
            target_fps: pacer.target_fps(),
        };

        for participant in participants.iter_mut() {
            participant
                .begin_frame(&info)
                .with_context(|| format!("participant '{}' failed to begin frame", participant.name()))?;
        }

        let close_requested = match draw_fn.as_mut() {
            Some(draw) => {
                let mut ctx = FrameCtx::new(&info, quick_draw, device);
                draw(&mut ctx)?;
                ctx.close_requested()
            }
            None => false,
        };

        device.begin_pass(*clear_color)?;
        quick_draw.add_to_pass(device)?;

        if *show_metrics {
            // The overlay is laid out against the whole window, whatever
            // viewport the user left set. Viewports are read at submission.
            let user_viewport = quick_draw.viewport();
            let (width, height) = info.size;
            quick_draw.set_viewport(0.0, 0.0, width as f32, height as f32);
            metrics.finalize_frame(&info, quick_draw)?;
            quick_draw.add_to_pass(device)?;
            quick_draw.set_viewport(
                user_viewport.x,
                user_viewport.y,
                user_viewport.width,
                user_viewport.height,
            );
        }
        for participant in participants.iter_mut() {
            participant
                .finalize_frame(&info, quick_draw)
                .with_context(|| format!("participant '{}' failed to finalize frame", participant.name()))?;
        }
        quick_draw.add_to_pass(device)?;

        quick_draw.flush(device)?;
        device.end_pass()?;
        device.end_frame()?;

        if let Some(callback) = frame_finished_fn.as_mut() {
            let mut ctx = FrameFinishedCtx {
                dt: ft.dt,
                frame_index: *frame_count,
                device: &mut *device,
            };
            callback(&mut ctx)?;
        }

        fps.record_frame(ft.dt);
        *frame_count += 1;
        if close_requested {
            platform.request_close();
        }
        platform.end_input_frame();
        device.present();
        pacer.pace(ft.now);

        Ok(())
    }
}
