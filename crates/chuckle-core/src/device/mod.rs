//! Render device: GPU context, surface, resources and the frame protocol.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue and configuring the surface
//! - owning textures and samplers behind copyable handles
//! - exposing the backend-neutral `RenderDevice` trait driven by the frame loop
//! - the wgpu implementation of that trait (`WgpuDevice`)

mod backend;
mod capture;
mod error;
mod frame;
mod gpu;
mod init;
mod resources;
mod surface;
mod wgpu_device;

pub use backend::{FrameStatus, RenderDevice};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub(crate) use resources::Resources;
pub use resources::{
    AddressMode, FilterMode, GpuTexture, SamplerHandle, SamplerSettings, TextureHandle,
};
pub use wgpu_device::WgpuDevice;
