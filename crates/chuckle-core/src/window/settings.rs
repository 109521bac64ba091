use crate::device::GpuInit;
use crate::paint::Color;

/// Window and frame-loop configuration.
#[derive(Debug, Clone)]
pub struct WindowSettings {
    pub title: String,
    /// Initial inner size in logical pixels.
    pub width: f64,
    pub height: f64,
    pub resizable: bool,
    pub vsync: bool,
    pub clear_color: Color,
    /// Frame-rate cap applied by the pacer; `None` runs uncapped.
    pub target_fps: Option<f64>,
    pub show_metrics: bool,
    pub gpu: GpuInit,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "chuckle".to_string(),
            width: 1280.0,
            height: 720.0,
            resizable: true,
            vsync: true,
            clear_color: Color::BLACK,
            target_fps: None,
            show_metrics: false,
            gpu: GpuInit::default(),
        }
    }
}

impl WindowSettings {
    pub fn new(title: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn target_fps(mut self, fps: f64) -> Self {
        self.target_fps = Some(fps);
        self
    }

    pub fn show_metrics(mut self, show: bool) -> Self {
        self.show_metrics = show;
        self
    }

    pub fn gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    /// GPU init with the present mode derived from `vsync`.
    pub(crate) fn gpu_init(&self) -> GpuInit {
        self.gpu.clone().with_vsync(self.vsync)
    }
}
