//! wgpu realization of QuickDraw submission.

use std::collections::HashMap;
use std::num::NonZeroU64;

use anyhow::Result;
use glam::Mat4;

use crate::coords::Viewport;
use crate::device::{Resources, SamplerHandle, TextureHandle};

use super::{expand_indices, DrawCall, Topology, Vertex};

const MATRIX_SIZE: u64 = std::mem::size_of::<Mat4>() as u64;
const VERTEX_SIZE: u64 = std::mem::size_of::<Vertex>() as u64;
const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

const MIN_VERTEX_BYTES: u64 = 4096 * VERTEX_SIZE;
const MIN_INDEX_BYTES: u64 = 1024 * INDEX_SIZE;
const MIN_UNIFORM_SLOTS: u64 = 64;

const TOPOLOGIES: [wgpu::PrimitiveTopology; 5] = [
    wgpu::PrimitiveTopology::TriangleList,
    wgpu::PrimitiveTopology::TriangleStrip,
    wgpu::PrimitiveTopology::LineList,
    wgpu::PrimitiveTopology::LineStrip,
    wgpu::PrimitiveTopology::PointList,
];

// ── growable buffer ───────────────────────────────────────────────────────

/// GPU buffer that grows by powers of two.
///
/// Buffers replaced mid-frame stay alive until the next `write`, which also
/// fills their prefix so commands already recorded against them stay valid.
struct GrowableBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
    retired: Vec<wgpu::Buffer>,
}

impl GrowableBuffer {
    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages, size: u64) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        Self {
            label,
            usage,
            buffer: Self::create(device, label, usage, size),
            retired: Vec::new(),
        }
    }

    fn create(device: &wgpu::Device, label: &str, usage: wgpu::BufferUsages, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    #[inline]
    fn capacity(&self) -> u64 {
        self.buffer.size()
    }

    /// Returns `true` when a new buffer had to be allocated.
    fn ensure(&mut self, device: &wgpu::Device, bytes: u64) -> bool {
        if bytes <= self.capacity() {
            return false;
        }
        let size = bytes.next_power_of_two();
        log::debug!("quickdraw: growing {} to {} bytes", self.label, size);
        let old = std::mem::replace(
            &mut self.buffer,
            Self::create(device, self.label, self.usage, size),
        );
        self.retired.push(old);
        true
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[u8]) {
        self.ensure(device, data.len() as u64);
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, data);
        }
        for old in self.retired.drain(..) {
            let n = (old.size() as usize).min(data.len());
            if n > 0 {
                queue.write_buffer(&old, 0, &data[..n]);
            }
        }
    }
}

// ── per-pass state ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PassState {
    pipeline: Option<wgpu::PrimitiveTopology>,
    matrix: Option<Mat4>,
    /// Cleared when the viewport falls outside the target; draws are skipped.
    viewport_ok: bool,
    /// Compensates for the part of the viewport clamped off the target.
    correction: Mat4,
}

/// GPU half of QuickDraw: pipelines, streaming buffers and bind groups.
pub(crate) struct QuickDrawGpu {
    pipelines: HashMap<wgpu::PrimitiveTopology, wgpu::RenderPipeline>,

    transform_bgl: wgpu::BindGroupLayout,
    texture_bgl: wgpu::BindGroupLayout,
    transform_bind_group: wgpu::BindGroup,
    texture_bind_groups: HashMap<(TextureHandle, SamplerHandle), wgpu::BindGroup>,

    uniform_stride: u64,
    vertices: GrowableBuffer,
    indices: GrowableBuffer,
    uniforms: GrowableBuffer,

    // Staged this frame, written at upload.
    index_staging: Vec<u32>,
    uniform_staging: Vec<u8>,

    pass: PassState,
}

impl QuickDrawGpu {
    pub(crate) fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("chuckle quickdraw shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quickdraw.wgsl").into()),
        });

        let transform_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("chuckle quickdraw transform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(MATRIX_SIZE),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("chuckle quickdraw texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("chuckle quickdraw pipeline layout"),
            bind_group_layouts: &[&transform_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipelines = TOPOLOGIES
            .into_iter()
            .map(|topology| {
                let pipeline = create_pipeline(device, &pipeline_layout, &shader, format, topology);
                (topology, pipeline)
            })
            .collect();

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = MATRIX_SIZE.next_multiple_of(alignment.max(1));

        let vertices = GrowableBuffer::new(
            device,
            "chuckle quickdraw vertices",
            wgpu::BufferUsages::VERTEX,
            MIN_VERTEX_BYTES,
        );
        let indices = GrowableBuffer::new(
            device,
            "chuckle quickdraw indices",
            wgpu::BufferUsages::INDEX,
            MIN_INDEX_BYTES,
        );
        let uniforms = GrowableBuffer::new(
            device,
            "chuckle quickdraw uniforms",
            wgpu::BufferUsages::UNIFORM,
            MIN_UNIFORM_SLOTS * uniform_stride,
        );
        let transform_bind_group = create_transform_bind_group(device, &transform_bgl, &uniforms.buffer);

        log::debug!(
            "quickdraw: pipelines ready (format={format:?}, uniform stride={uniform_stride})"
        );

        Self {
            pipelines,
            transform_bgl,
            texture_bgl,
            transform_bind_group,
            texture_bind_groups: HashMap::new(),
            uniform_stride,
            vertices,
            indices,
            uniforms,
            index_staging: Vec::new(),
            uniform_staging: Vec::new(),
            pass: PassState::default(),
        }
    }

    /// Resets binding state for a freshly opened render pass.
    pub(crate) fn begin_pass(&mut self) {
        self.pass = PassState {
            viewport_ok: true,
            ..PassState::default()
        };
    }

    /// Grows every buffer the upcoming `calls` can touch and binds them.
    pub(crate) fn prepare(
        &mut self,
        device: &wgpu::Device,
        pass: &mut wgpu::RenderPass<'static>,
        calls: &[DrawCall],
        vertex_count: usize,
    ) {
        self.vertices.ensure(device, vertex_count as u64 * VERTEX_SIZE);

        let extra_indices: u64 = calls
            .iter()
            .map(|c| c.topology.index_count(c.vertex_count as u32) as u64)
            .sum();
        self.indices.ensure(
            device,
            (self.index_staging.len() as u64 + extra_indices) * INDEX_SIZE,
        );

        let staged_slots = self.uniform_staging.len() as u64 / self.uniform_stride;
        let slot_bytes = (staged_slots + calls.len() as u64) * self.uniform_stride;
        if self.uniforms.ensure(device, slot_bytes) {
            self.transform_bind_group =
                create_transform_bind_group(device, &self.transform_bgl, &self.uniforms.buffer);
            // The new bind group must be set before the next draw.
            self.pass.matrix = None;
        }

        pass.set_vertex_buffer(0, self.vertices.buffer.slice(..));
        pass.set_index_buffer(self.indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    pub(crate) fn set_viewport(
        &mut self,
        pass: &mut wgpu::RenderPass<'static>,
        viewport: Viewport,
        target_size: (u32, u32),
    ) {
        match viewport.clip_to_target(target_size.0, target_size.1) {
            Some((v, correction)) => {
                pass.set_viewport(v.x, v.y, v.width, v.height, 0.0, 1.0);
                self.pass.viewport_ok = true;
                self.pass.correction = correction;
            }
            None => self.pass.viewport_ok = false,
        }
    }

    /// Stages `matrix`, corrected for the current viewport, in the next
    /// uniform slot unless it equals the bound one.
    pub(crate) fn bind_transform_projection(
        &mut self,
        pass: &mut wgpu::RenderPass<'static>,
        matrix: &Mat4,
    ) {
        let matrix = self.pass.correction * *matrix;
        if self.pass.matrix == Some(matrix) {
            return;
        }

        let offset = self.uniform_staging.len() as u64;
        self.uniform_staging
            .extend_from_slice(bytemuck::bytes_of(&matrix.to_cols_array()));
        self.uniform_staging
            .resize((offset + self.uniform_stride) as usize, 0);

        pass.set_bind_group(0, &self.transform_bind_group, &[offset as u32]);
        self.pass.matrix = Some(matrix);
    }

    pub(crate) fn bind_texture(
        &mut self,
        device: &wgpu::Device,
        resources: &Resources,
        pass: &mut wgpu::RenderPass<'static>,
        texture: TextureHandle,
        sampler: SamplerHandle,
    ) {
        let key = resolve_binding(resources, texture, sampler);
        let layout = &self.texture_bgl;
        let bind_group = self.texture_bind_groups.entry(key).or_insert_with(|| {
            create_texture_bind_group(
                device,
                layout,
                &resources.texture_or_white(key.0).view,
                resources.sampler_or_bilinear(key.1),
            )
        });
        pass.set_bind_group(1, &*bind_group, &[]);
    }

    pub(crate) fn draw(
        &mut self,
        pass: &mut wgpu::RenderPass<'static>,
        topology: Topology,
        first_vertex: u32,
        vertex_count: u32,
    ) {
        if vertex_count == 0 || !self.pass.viewport_ok {
            return;
        }

        let gpu_topology = topology.gpu_topology();
        if self.pass.pipeline != Some(gpu_topology) {
            let Some(pipeline) = self.pipelines.get(&gpu_topology) else {
                return;
            };
            pass.set_pipeline(pipeline);
            self.pass.pipeline = Some(gpu_topology);
        }

        if topology.needs_indices() {
            let start = self.index_staging.len() as u32;
            expand_indices(topology, first_vertex, vertex_count, &mut self.index_staging);
            let end = self.index_staging.len() as u32;
            if end > start {
                pass.draw_indexed(start..end, 0, 0..1);
            }
        } else {
            pass.draw(first_vertex..first_vertex + vertex_count, 0..1);
        }
    }

    /// Writes this frame's vertices, indices and matrices, then resets staging.
    pub(crate) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        vertices: &[Vertex],
    ) -> Result<()> {
        self.vertices
            .write(device, queue, bytemuck::cast_slice(vertices));
        self.indices
            .write(device, queue, bytemuck::cast_slice(&self.index_staging));
        self.uniforms.write(device, queue, &self.uniform_staging);

        log::trace!(
            "quickdraw: uploaded {} vertices, {} indices, {} matrices",
            vertices.len(),
            self.index_staging.len(),
            self.uniform_staging.len() as u64 / self.uniform_stride
        );

        self.index_staging.clear();
        self.uniform_staging.clear();
        Ok(())
    }

    /// Drops cached bind groups that reference `texture`.
    pub(crate) fn forget_texture(&mut self, texture: TextureHandle) {
        self.texture_bind_groups.retain(|(t, _), _| *t != texture);
    }
}

/// Falls back to the default bindings for handles the registry does not know.
fn resolve_binding(
    resources: &Resources,
    texture: TextureHandle,
    sampler: SamplerHandle,
) -> (TextureHandle, SamplerHandle) {
    let texture = if resources.texture(texture).is_some() {
        texture
    } else {
        log::warn!("quickdraw: unknown texture {texture:?}, using white");
        TextureHandle::WHITE
    };
    let sampler = if resources.sampler(sampler).is_some() {
        sampler
    } else {
        log::warn!("quickdraw: unknown sampler {sampler:?}, using bilinear");
        SamplerHandle::BILINEAR
    };
    (texture, sampler)
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    let strip_index_format = match topology {
        wgpu::PrimitiveTopology::TriangleStrip | wgpu::PrimitiveTopology::LineStrip => {
            Some(wgpu::IndexFormat::Uint32)
        }
        _ => None,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("chuckle quickdraw pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[Vertex::layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn create_transform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("chuckle quickdraw transform bind group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(MATRIX_SIZE),
            }),
        }],
    })
}

fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("chuckle quickdraw texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
