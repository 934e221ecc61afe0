//! Procedural fractal texture.
//!
//! A compute pass rewrites one shared texture every frame from a wrapping
//! animation tick. The per-pixel math is mirrored here on the CPU (same
//! constants as `shaders/fractal.wgsl`) so it can be checked without a GPU.

use bytemuck::{Pod, Zeroable};

use crate::scene::TextureSize;

/// The tick wraps back to zero after this many frames.
pub const TICK_PERIOD: u32 = 5000;

/// Iteration cap of the escape test.
pub const MAX_ITERATIONS: u32 = 1000;

/// Storage/sample format of the fractal texture.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

const ZOOM_FREQUENCY: f32 = 0.01;
const ZOOM_EXPONENT: f32 = 4.0;
const ZOOM_LOW: f32 = 0.62;
const ZOOM_RANGE: f32 = 0.38;
const PIXEL_OFFSET: [f32; 2] = [-0.2, -0.35];
const PLANE_ORIGIN: [f32; 2] = [-1.2, -0.32];
const PLANE_SCALE: [f32; 2] = [2.2, 2.0];
const ESCAPE_RADIUS_SQ: f32 = 4.0;

const WORKGROUP_SIZE: u32 = 8;

/// Animation tick source. Each frame gets the next tick modulo [`TICK_PERIOD`].
#[derive(Debug, Default, Clone)]
pub struct FractalClock {
    next: u32,
}

impl FractalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this frame's tick and moves on.
    pub fn advance(&mut self) -> u32 {
        let tick = self.next;
        self.next = (self.next + 1) % TICK_PERIOD;
        tick
    }
}

/// Zoom factor for `tick`.
pub fn zoom(tick: u32) -> f32 {
    (ZOOM_LOW + ZOOM_RANGE * (ZOOM_FREQUENCY * tick as f32).cos()).powf(ZOOM_EXPONENT)
}

/// Number of iterations before `z -> z^2 + c` leaves the escape radius.
pub fn escape_iterations(cx: f32, cy: f32, max_iterations: u32) -> u32 {
    let (mut x, mut y) = (0.0f32, 0.0f32);
    let mut i = 0;
    while x * x + y * y <= ESCAPE_RADIUS_SQ && i < max_iterations {
        let xt = x * x - y * y + cx;
        y = 2.0 * x * y + cy;
        x = xt;
        i += 1;
    }
    i
}

/// Gray level in `[0, 1]` for texel `(px, py)` at `tick`.
pub fn shade(px: u32, py: u32, size: TextureSize, tick: u32) -> f32 {
    let z = zoom(tick);
    let u = px as f32 / size.width as f32;
    let v = py as f32 / size.height as f32;
    let cx = z * PLANE_SCALE[0] * (u + PIXEL_OFFSET[0]) + PLANE_ORIGIN[0];
    let cy = z * PLANE_SCALE[1] * (v + PIXEL_OFFSET[1]) + PLANE_ORIGIN[1];
    let n = escape_iterations(cx, cy, MAX_ITERATIONS);
    0.5 + 0.5 * (3.0 + n as f32 * 0.15).cos()
}

/// Row-major RGBA8 image equivalent to one compute dispatch.
pub fn render_reference(size: TextureSize, tick: u32) -> Vec<[u8; 4]> {
    let mut out = Vec::with_capacity(size.texel_count());
    for py in 0..size.height {
        for px in 0..size.width {
            let g = (shade(px, py, size, tick).clamp(0.0, 1.0) * 255.0).round() as u8;
            out.push([g, g, g, 255]);
        }
    }
    out
}

/// Matches `FractalParams` in `fractal.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FractalParams {
    tick: u32,
    max_iterations: u32,
    _pad: [u32; 2],
}

/// GPU side: the shared texture plus the compute pipeline that fills it.
pub struct FractalPass {
    size: TextureSize,
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
    params_ubo: wgpu::Buffer,
}

impl FractalPass {
    pub fn new(device: &wgpu::Device, size: TextureSize) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessera fractal texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera fractal shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/fractal.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessera fractal bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: TEXTURE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FractalParams>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessera fractal pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("tessera fractal pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tessera fractal params ubo"),
            size: std::mem::size_of::<FractalParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessera fractal bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_ubo.as_entire_binding(),
                },
            ],
        });

        log::debug!("fractal pass ready ({}x{})", size.width, size.height);

        Self {
            size,
            texture,
            view,
            pipeline,
            bind_group,
            params_ubo,
        }
    }

    #[inline]
    pub fn size(&self) -> TextureSize {
        self.size
    }

    #[inline]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// View for sampling in the raster pass.
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Stages the tick for the next submission.
    pub fn write_tick(&self, queue: &wgpu::Queue, tick: u32) {
        let params = FractalParams {
            tick,
            max_iterations: MAX_ITERATIONS,
            _pad: [0; 2],
        };
        queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&params));
    }

    /// Records the dispatch. Must be encoded before any pass that samples
    /// [`view`](Self::view) in the same command buffer.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("tessera fractal pass"),
            timestamp_writes: None,
        });
        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_group, &[]);
        cpass.dispatch_workgroups(
            self.size.width.div_ceil(WORKGROUP_SIZE),
            self.size.height.div_ceil(WORKGROUP_SIZE),
            1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_wraps_at_period() {
        let mut clock = FractalClock::new();
        assert_eq!(clock.advance(), 0);
        assert_eq!(clock.advance(), 1);
        for _ in 2..TICK_PERIOD {
            clock.advance();
        }
        assert_eq!(clock.advance(), 0);
    }

    #[test]
    fn frames_one_period_apart_produce_identical_textures() {
        let size = TextureSize::square(16);
        let mut clock = FractalClock::new();
        let ticks: Vec<u32> = (0..TICK_PERIOD + 10).map(|_| clock.advance()).collect();

        for frame in [3usize, 9] {
            let a = render_reference(size, ticks[frame]);
            let b = render_reference(size, ticks[frame + TICK_PERIOD as usize]);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn zoom_repeats_with_cosine_period() {
        // 2π / 0.01 ≈ 628.3, so 628 ticks later the zoom is nearly the same.
        for t in [0u32, 100, 1234] {
            assert!((zoom(t) - zoom(t + 628)).abs() < 1e-2, "tick {t}");
        }
        assert!((zoom(0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_stays_in_expected_range() {
        let low = (ZOOM_LOW - ZOOM_RANGE).powf(ZOOM_EXPONENT);
        for t in 0..TICK_PERIOD {
            let z = zoom(t);
            assert!(z >= low - 1e-6 && z <= 1.0 + 1e-6, "tick {t}: {z}");
        }
    }

    #[test]
    fn escape_test_bounds() {
        // Origin is inside the set: runs to the cap.
        assert_eq!(escape_iterations(0.0, 0.0, MAX_ITERATIONS), MAX_ITERATIONS);
        // Far outside escapes after the first step.
        assert_eq!(escape_iterations(3.0, 3.0, MAX_ITERATIONS), 1);
    }

    #[test]
    fn output_is_opaque_grayscale() {
        let img = render_reference(TextureSize::new(8, 4), 42);
        assert_eq!(img.len(), 32);
        for px in img {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn single_texel_texture_samples_top_left_of_plane() {
        let size = TextureSize::square(1);
        let z = zoom(0);
        let cx = z * PLANE_SCALE[0] * PIXEL_OFFSET[0] + PLANE_ORIGIN[0];
        let cy = z * PLANE_SCALE[1] * PIXEL_OFFSET[1] + PLANE_ORIGIN[1];
        let n = escape_iterations(cx, cy, MAX_ITERATIONS);
        let expected = 0.5 + 0.5 * (3.0 + n as f32 * 0.15).cos();
        assert_eq!(shade(0, 0, size, 0), expected);
    }

    #[test]
    fn params_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<FractalParams>(), 16);
    }
}
