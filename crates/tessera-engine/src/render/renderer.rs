use anyhow::{ensure, Result};
use wgpu::util::DeviceExt;

use crate::scene::{
    cube_indices, cube_vertices, CameraData, InstanceData, SceneConfig, Vertex, CUBE_INDEX_COUNT,
};

use super::fractal::FractalPass;
use super::schedule::{FrameScheduler, FrameTicket};
use super::{RenderCtx, RenderTarget};

/// Upper bound on device polls while draining in-flight frames at teardown.
const DRAIN_POLL_LIMIT: u32 = 10_000;

/// GPU copies of one ring slot.
struct GpuSlot {
    instance_vbo: wgpu::Buffer,
    camera_ubo: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
}

/// Instanced cube field textured with a per-frame compute-generated fractal.
///
/// Usage per frame:
/// - [`prepare`](Self::prepare) waits for a free slot, animates and uploads it
/// - [`encode`](Self::encode) records compute + raster into the frame's
///   encoder and hands the slot permit to the submission's completion
///
/// Both passes share one command buffer, so the raster pass always samples
/// the texture written by the same frame's dispatch.
pub struct CubeFieldRenderer {
    config: SceneConfig,
    scheduler: FrameScheduler,
    fractal: FractalPass,

    pipeline: wgpu::RenderPipeline,
    texture_bind_group: wgpu::BindGroup,

    cube_vbo: wgpu::Buffer,
    cube_ibo: wgpu::Buffer,
    slots: Vec<GpuSlot>,

    /// Kept to drive completions while waiting and at teardown.
    device: wgpu::Device,
}

impl CubeFieldRenderer {
    pub fn new(ctx: &RenderCtx<'_>, config: SceneConfig) -> Result<Self> {
        config.validate()?;

        let max_side = ctx.device.limits().max_texture_dimension_2d;
        ensure!(
            config.texture_size.width <= max_side && config.texture_size.height <= max_side,
            "fractal texture {:?} exceeds device limit {max_side}",
            config.texture_size
        );

        let instance_count = config.instance_count() as usize;
        let instance_bytes = (instance_count * std::mem::size_of::<InstanceData>()) as u64;
        let max_buffer = ctx.device.limits().max_buffer_size;
        ensure!(
            instance_bytes <= max_buffer,
            "{instance_count} instances need {instance_bytes} bytes, device allows {max_buffer}"
        );

        let fractal = FractalPass::new(ctx.device, config.texture_size);

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let camera_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tessera camera bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<CameraData>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let texture_bgl = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("tessera fractal sample bgl"),
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

        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessera fractal sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let texture_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera fractal sample bind group"),
            layout: &texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(fractal.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tessera scene pipeline layout"),
                bind_group_layouts: &[&camera_bgl, &texture_bgl],
                immediate_size: 0,
            });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera scene pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout(), InstanceData::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: Some(wgpu::DepthStencilState {
                format: ctx.depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        let cube_vbo = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tessera cube vbo"),
                contents: bytemuck::cast_slice(&cube_vertices()),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let cube_ibo = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("tessera cube ibo"),
                contents: bytemuck::cast_slice(&cube_indices()),
                usage: wgpu::BufferUsages::INDEX,
            });

        let slots = (0..config.ring_depth)
            .map(|i| {
                let instance_vbo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("tessera instance vbo {i}")),
                    size: instance_bytes,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let camera_ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("tessera camera ubo {i}")),
                    size: std::mem::size_of::<CameraData>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let camera_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("tessera camera bind group {i}")),
                    layout: &camera_bgl,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: camera_ubo.as_entire_binding(),
                    }],
                });
                GpuSlot {
                    instance_vbo,
                    camera_ubo,
                    camera_bind_group,
                }
            })
            .collect();

        log::info!(
            "cube field ready: {:?} grid, {} instances, {} frames in flight, {}x{} texture",
            config.grid,
            instance_count,
            config.ring_depth,
            config.texture_size.width,
            config.texture_size.height
        );

        Ok(Self {
            scheduler: FrameScheduler::new(&config),
            config,
            fractal,
            pipeline,
            texture_bind_group,
            cube_vbo,
            cube_ibo,
            slots,
            device: ctx.device.clone(),
        })
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    #[inline]
    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Per-instance vertex stream of ring slot `slot`.
    pub fn instance_buffer(&self, slot: usize) -> &wgpu::Buffer {
        &self.slots[slot % self.slots.len()].instance_vbo
    }

    /// Camera uniform of ring slot `slot`.
    pub fn camera_buffer(&self, slot: usize) -> &wgpu::Buffer {
        &self.slots[slot % self.slots.len()].camera_ubo
    }

    /// The shared compute-written texture.
    pub fn fractal(&self) -> &FractalPass {
        &self.fractal
    }

    /// Admits the next frame and stages its data for upload.
    ///
    /// Blocks (polling the device) while every ring slot is still in use by
    /// the GPU. Staged writes land in the next queue submission.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>) -> FrameTicket {
        let device = &self.device;
        let ticket = self.scheduler.begin_frame(|| {
            if let Err(e) = device.poll(wgpu::PollType::Poll) {
                log::warn!("device poll failed while waiting for a frame slot: {e}");
            }
        });

        let data = self.scheduler.slot(ticket.slot);
        let gpu = &self.slots[ticket.slot];
        ctx.queue
            .write_buffer(&gpu.instance_vbo, 0, bytemuck::cast_slice(&data.instances));
        ctx.queue
            .write_buffer(&gpu.camera_ubo, 0, bytemuck::bytes_of(&data.camera));
        self.fractal.write_tick(ctx.queue, ticket.tick);

        ticket
    }

    /// Records the fractal dispatch followed by the cube pass.
    ///
    /// The ticket's permit is released when this frame's submission completes.
    pub fn encode(&self, target: &mut RenderTarget<'_>, ticket: FrameTicket) {
        self.fractal.encode(target.encoder);

        let gpu = &self.slots[ticket.slot];
        {
            let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tessera scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color.to_wgpu()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_depth),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &gpu.camera_bind_group, &[]);
            rpass.set_bind_group(1, &self.texture_bind_group, &[]);
            rpass.set_vertex_buffer(0, self.cube_vbo.slice(..));
            rpass.set_vertex_buffer(1, gpu.instance_vbo.slice(..));
            rpass.set_index_buffer(self.cube_ibo.slice(..), wgpu::IndexFormat::Uint16);
            rpass.draw_indexed(0..CUBE_INDEX_COUNT, 0, 0..self.config.instance_count());
        }

        let frame = ticket.frame;
        let permit = ticket.into_permit();
        target.on_complete(move || {
            log::trace!("frame {frame} completed");
            permit.release();
        });
    }

    /// Polls until every submitted frame has completed, or gives up.
    pub fn drain(&self) {
        let gate = self.scheduler.gate();
        let mut polls = 0;
        while gate.in_flight() > 0 && polls < DRAIN_POLL_LIMIT {
            if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
                log::warn!("device poll failed while draining: {e}");
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
            polls += 1;
        }

        let left = gate.in_flight();
        if left > 0 {
            log::warn!("{left} frame(s) still in flight at teardown");
        } else {
            log::debug!("all frames drained after {polls} poll(s)");
        }
    }
}

impl Drop for CubeFieldRenderer {
    fn drop(&mut self) {
        self.drain();
    }
}
