use std::sync::Arc;

use anyhow::{Context, Result};
use glam::Mat4;
use image::RgbaImage;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::error::Error;
use crate::paint::Color;
use crate::quickdraw::{DrawCall, DrawTarget, QuickDrawGpu, Topology, Vertex, VertexSink};

use super::capture;
use super::{
    FrameStatus, Gpu, GpuFrame, GpuInit, RenderDevice, Resources, SamplerHandle, SamplerSettings,
    SurfaceErrorAction, TextureHandle,
};

/// `RenderDevice` backed by wgpu and a winit window.
pub struct WgpuDevice {
    window: Arc<Window>,
    gpu: Gpu,
    resources: Resources,
    quick_draw: QuickDrawGpu,

    /// Acquired frame with its encoder still open.
    frame: Option<GpuFrame>,
    /// Open default pass; borrows nothing thanks to `forget_lifetime`, so it
    /// must be dropped before `frame.encoder` is finished.
    pass: Option<wgpu::RenderPass<'static>>,
    /// Submitted frame waiting for `present`.
    submitted: Option<wgpu::SurfaceTexture>,
}

impl WgpuDevice {
    /// Creates the GPU context for `window`, blocking on adapter/device requests.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let gpu = pollster::block_on(Gpu::new(window.clone(), init))
            .context("failed to initialize GPU")?;
        let resources = Resources::new(gpu.device(), gpu.queue());
        let quick_draw = QuickDrawGpu::new(gpu.device(), gpu.surface_format());

        Ok(Self {
            window,
            gpu,
            resources,
            quick_draw,
            frame: None,
            pass: None,
            submitted: None,
        })
    }

    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }
}

impl DrawTarget for WgpuDevice {
    fn prepare(&mut self, calls: &[DrawCall], vertex_count: usize) -> Result<()> {
        let pass = self
            .pass
            .as_mut()
            .ok_or(Error::InvalidOperation("add_to_pass requires an active render pass"))?;
        self.quick_draw
            .prepare(self.gpu.device(), pass, calls, vertex_count);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        let size = self.size();
        if let Some(pass) = self.pass.as_mut() {
            self.quick_draw.set_viewport(pass, viewport, size);
        }
    }

    fn bind_transform_projection(&mut self, matrix: &Mat4) {
        if let Some(pass) = self.pass.as_mut() {
            self.quick_draw.bind_transform_projection(pass, matrix);
        }
    }

    fn bind_texture(&mut self, texture: TextureHandle, sampler: SamplerHandle) {
        if let Some(pass) = self.pass.as_mut() {
            self.quick_draw.bind_texture(
                self.gpu.device(),
                &self.resources,
                pass,
                texture,
                sampler,
            );
        }
    }

    fn draw(&mut self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        match self.pass.as_mut() {
            Some(pass) => self
                .quick_draw
                .draw(pass, topology, first_vertex, vertex_count),
            None => log::warn!("draw issued with no active render pass; ignored"),
        }
    }
}

impl VertexSink for WgpuDevice {
    fn upload_vertices(&mut self, vertices: &[Vertex]) -> Result<()> {
        self.quick_draw
            .upload(self.gpu.device(), self.gpu.queue(), vertices)
    }
}

impl RenderDevice for WgpuDevice {
    fn begin_frame(&mut self) -> Result<FrameStatus> {
        if self.frame.is_some() || self.submitted.is_some() {
            return Err(Error::InvalidOperation(
                "begin_frame called before the previous frame was presented",
            )
            .into());
        }

        let (width, height) = self.size();
        if width == 0 || height == 0 {
            // Minimized; nothing to render into.
            return Ok(FrameStatus::Skipped);
        }

        match self.gpu.acquire_frame() {
            Ok(frame) => {
                self.frame = Some(frame);
                Ok(FrameStatus::Ready)
            }
            Err(err) => match self.gpu.recover(err.clone()) {
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                    log::warn!("surface error: {err:?}; skipping frame");
                    Ok(FrameStatus::Skipped)
                }
                SurfaceErrorAction::Fatal => Err(Error::Surface(err).into()),
            },
        }
    }

    fn begin_pass(&mut self, clear: Color) -> Result<()> {
        if self.pass.is_some() {
            return Err(Error::InvalidOperation("a render pass is already open").into());
        }
        let frame = self
            .frame
            .as_mut()
            .ok_or(Error::InvalidOperation("begin_pass requires an acquired frame"))?;

        let pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("chuckle default pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            })
            .forget_lifetime();

        self.pass = Some(pass);
        self.quick_draw.begin_pass();
        Ok(())
    }

    fn end_pass(&mut self) -> Result<()> {
        match self.pass.take() {
            Some(pass) => {
                drop(pass);
                Ok(())
            }
            None => Err(Error::InvalidOperation("end_pass without an open render pass").into()),
        }
    }

    fn end_frame(&mut self) -> Result<()> {
        if self.pass.take().is_some() {
            log::warn!("end_frame with an open render pass; closing it");
        }
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = self
            .frame
            .take()
            .ok_or(Error::InvalidOperation("end_frame without an acquired frame"))?;

        self.gpu.queue().submit(std::iter::once(encoder.finish()));
        drop(view);
        self.submitted = Some(surface_texture);
        Ok(())
    }

    fn present(&mut self) {
        if let Some(surface_texture) = self.submitted.take() {
            self.window.pre_present_notify();
            surface_texture.present();
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        log::debug!("resize to {width}x{height}");
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    fn size_in_pixels(&self) -> (u32, u32) {
        self.size()
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<TextureHandle> {
        self.resources
            .create_texture(self.gpu.device(), self.gpu.queue(), width, height, rgba)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) -> Result<()> {
        self.resources.destroy_texture(texture)?;
        self.quick_draw.forget_texture(texture);
        Ok(())
    }

    fn create_sampler(&mut self, settings: SamplerSettings) -> Result<SamplerHandle> {
        Ok(self.resources.create_sampler(self.gpu.device(), settings))
    }

    fn read_pixels(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<RgbaImage> {
        let surface_texture = self.submitted.as_ref().ok_or(Error::InvalidOperation(
            "read_pixels is only valid between end_frame and present",
        ))?;
        capture::read_texture(
            self.gpu.device(),
            self.gpu.queue(),
            &surface_texture.texture,
            x,
            y,
            width,
            height,
        )
    }
}
