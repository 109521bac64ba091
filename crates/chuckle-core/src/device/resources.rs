use anyhow::Result;

use crate::error::Error;

/// Non-owning reference to a texture held by the render device.
///
/// Copyable and cheap to store in draw calls. Slot 0 is a 1x1 white texture
/// that always exists and backs untextured drawing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub const WHITE: TextureHandle = TextureHandle(0);

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }
}

/// Non-owning reference to a sampler held by the render device.
///
/// Slot 0 is the default bilinear, clamp-to-edge sampler.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SamplerHandle(u32);

impl SamplerHandle {
    pub const BILINEAR: SamplerHandle = SamplerHandle(0);

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn from_index(index: u32) -> Self {
        Self(index)
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

impl FilterMode {
    fn to_wgpu(self) -> wgpu::FilterMode {
        match self {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

impl AddressMode {
    fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            AddressMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            AddressMode::Repeat => wgpu::AddressMode::Repeat,
            AddressMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
        }
    }
}

/// Sampler configuration. The default matches [`SamplerHandle::BILINEAR`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SamplerSettings {
    pub filter: FilterMode,
    pub address: AddressMode,
}

impl SamplerSettings {
    pub const NEAREST: SamplerSettings = SamplerSettings {
        filter: FilterMode::Nearest,
        address: AddressMode::ClampToEdge,
    };

    pub fn with_address(mut self, address: AddressMode) -> Self {
        self.address = address;
        self
    }
}

/// A device-owned texture and its default view.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height()
    }
}

/// Texture and sampler registry addressed by handles.
pub(crate) struct Resources {
    white: GpuTexture,
    /// User textures; handle index `i` lives at `textures[i - 1]`.
    textures: Vec<Option<GpuTexture>>,

    bilinear: wgpu::Sampler,
    /// User samplers; handle index `i` lives at `samplers[i - 1]`.
    samplers: Vec<wgpu::Sampler>,
}

impl Resources {
    pub(crate) fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = upload_rgba(device, queue, "chuckle white texture", 1, 1, &[255; 4]);
        let bilinear = create_wgpu_sampler(device, SamplerSettings::default());
        Self {
            white,
            textures: Vec::new(),
            bilinear,
            samplers: Vec::new(),
        }
    }

    /// Uploads tightly packed RGBA8 pixels as a new sRGB texture.
    pub(crate) fn create_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<TextureHandle> {
        validate_rgba(width, height, rgba, device.limits().max_texture_dimension_2d)?;

        let texture = upload_rgba(device, queue, "chuckle texture", width, height, rgba);
        self.textures.push(Some(texture));
        let handle = TextureHandle(self.textures.len() as u32);
        log::debug!("created texture {handle:?} ({width}x{height})");
        Ok(handle)
    }

    /// Releases a user texture. The white texture cannot be destroyed.
    pub(crate) fn destroy_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if handle == TextureHandle::WHITE {
            return Err(Error::InvalidOperation("the default white texture cannot be destroyed").into());
        }
        let slot = self
            .textures
            .get_mut(handle.0 as usize - 1)
            .and_then(Option::take);
        match slot {
            Some(texture) => {
                texture.texture.destroy();
                Ok(())
            }
            None => Err(Error::InvalidOperation("texture handle is not live").into()),
        }
    }

    pub(crate) fn create_sampler(
        &mut self,
        device: &wgpu::Device,
        settings: SamplerSettings,
    ) -> SamplerHandle {
        self.samplers.push(create_wgpu_sampler(device, settings));
        SamplerHandle(self.samplers.len() as u32)
    }

    pub(crate) fn texture(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        match handle.0 {
            0 => Some(&self.white),
            i => self.textures.get(i as usize - 1).and_then(Option::as_ref),
        }
    }

    pub(crate) fn sampler(&self, handle: SamplerHandle) -> Option<&wgpu::Sampler> {
        match handle.0 {
            0 => Some(&self.bilinear),
            i => self.samplers.get(i as usize - 1),
        }
    }

    pub(crate) fn texture_or_white(&self, handle: TextureHandle) -> &GpuTexture {
        self.texture(handle).unwrap_or(&self.white)
    }

    pub(crate) fn sampler_or_bilinear(&self, handle: SamplerHandle) -> &wgpu::Sampler {
        self.sampler(handle).unwrap_or(&self.bilinear)
    }
}

fn validate_rgba(width: u32, height: u32, rgba: &[u8], max_dimension: u32) -> Result<()> {
    let fail = |reason: String| -> anyhow::Error {
        Error::ResourceCreation {
            what: "texture",
            reason,
        }
        .into()
    };

    if width == 0 || height == 0 {
        return Err(fail(format!("empty size {width}x{height}")));
    }
    if width > max_dimension || height > max_dimension {
        return Err(fail(format!(
            "{width}x{height} exceeds the device limit of {max_dimension}"
        )));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(fail(format!(
            "expected {expected} bytes of RGBA8 data, got {}",
            rgba.len()
        )));
    }
    Ok(())
}

fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

fn create_wgpu_sampler(device: &wgpu::Device, settings: SamplerSettings) -> wgpu::Sampler {
    let filter = settings.filter.to_wgpu();
    let address = settings.address.to_wgpu();
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("chuckle sampler"),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: filter,
        min_filter: filter,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handles_are_slot_zero() {
        assert_eq!(TextureHandle::WHITE.index(), 0);
        assert_eq!(SamplerHandle::BILINEAR.index(), 0);
        assert_eq!(SamplerSettings::default().filter, FilterMode::Linear);
        assert_eq!(SamplerSettings::default().address, AddressMode::ClampToEdge);
    }

    #[test]
    fn rgba_length_must_match_size() {
        assert!(validate_rgba(2, 2, &[0; 16], 8192).is_ok());

        let err = validate_rgba(2, 2, &[0; 15], 8192).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ResourceCreation { what: "texture", .. })
        ));
    }

    #[test]
    fn empty_or_oversized_textures_are_rejected() {
        assert!(validate_rgba(0, 4, &[], 8192).is_err());
        assert!(validate_rgba(9000, 1, &[0; 36000], 8192).is_err());
    }
}
