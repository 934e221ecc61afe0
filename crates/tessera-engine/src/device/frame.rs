/// Callback run once the GPU has finished a submitted frame.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// Represents a single acquired frame.
///
/// Short-lived: holding the surface texture prevents acquisition of the next
/// one. Everything recorded into `encoder` is submitted as one command buffer.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub depth_view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,

    /// Registered against this frame's submission, in order.
    pub completions: Vec<Completion>,
}
