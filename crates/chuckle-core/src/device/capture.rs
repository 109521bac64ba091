use std::sync::mpsc::{self, TryRecvError};

use anyhow::Result;
use image::RgbaImage;

use crate::error::Error;

/// Reads an 8-bit RGBA/BGRA texture region back to the CPU.
///
/// Blocks until the copy completes. The texture needs `COPY_SRC` usage.
pub(crate) fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<RgbaImage> {
    let format = texture.format();
    let swap_red_blue = match format {
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => true,
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => false,
        other => return Err(Error::Capture(format!("unsupported surface format {other:?}")).into()),
    };

    if !texture.usage().contains(wgpu::TextureUsages::COPY_SRC) {
        return Err(Error::Capture("surface was not configured with COPY_SRC".into()).into());
    }

    check_region(x, y, width, height, texture.width(), texture.height())?;

    let unpadded_row = width * 4;
    let padded_row = padded_bytes_per_row(width);

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("chuckle capture buffer"),
        size: padded_row as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("chuckle capture encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x, y, z: 0 },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    let mapped = loop {
        device
            .poll(wgpu::PollType::Poll)
            .map_err(|e| Error::Capture(format!("device poll failed: {e}")))?;
        match rx.try_recv() {
            Ok(result) => break result,
            Err(TryRecvError::Empty) => std::thread::yield_now(),
            Err(TryRecvError::Disconnected) => {
                return Err(Error::Capture("map callback dropped".into()).into());
            }
        }
    };
    mapped.map_err(|e| Error::Capture(format!("buffer map failed: {e}")))?;

    let pixels = {
        let data = slice.get_mapped_range();
        unpad_rows(&data, unpadded_row, padded_row, height, swap_red_blue)
    };
    buffer.unmap();

    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| Error::Capture("pixel buffer size mismatch".into()).into())
}

fn check_region(x: u32, y: u32, width: u32, height: u32, tw: u32, th: u32) -> Result<()> {
    let fits = width > 0
        && height > 0
        && x.checked_add(width).is_some_and(|r| r <= tw)
        && y.checked_add(height).is_some_and(|b| b <= th);
    if fits {
        Ok(())
    } else {
        Err(Error::Capture(format!(
            "region {width}x{height} at ({x}, {y}) is outside the {tw}x{th} frame"
        ))
        .into())
    }
}

fn padded_bytes_per_row(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Strips row padding and converts BGRA to RGBA when asked.
fn unpad_rows(data: &[u8], unpadded: u32, padded: u32, height: u32, swap_red_blue: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(unpadded as usize * height as usize);
    for row in data.chunks(padded as usize).take(height as usize) {
        out.extend_from_slice(&row[..unpadded as usize]);
    }
    if swap_red_blue {
        for px in out.chunks_exact_mut(4) {
            px.swap(0, 2);
        }
    }
    out
}
