//! GPU rendering subsystem.
//!
//! Each frame runs a compute pass that regenerates the fractal texture, then
//! a raster pass that draws the instanced cube field sampling it. Frames are
//! pipelined over a small ring of per-frame buffers; a counting gate keeps
//! the CPU from overwriting a slot the GPU is still reading.
//!
//! Layout:
//! - `gate` / `ring`: frame admission and slot rotation
//! - `schedule`: the CPU half of a frame (no wgpu)
//! - `fractal`: compute pass plus its CPU mirror
//! - `renderer`: pipelines, buffers and per-frame encoding

mod ctx;
pub mod fractal;
mod gate;
mod renderer;
mod ring;
mod schedule;

pub use ctx::{RenderCtx, RenderTarget};
pub use fractal::{FractalClock, FractalPass};
pub use gate::{FrameGate, FramePermit};
pub use renderer::CubeFieldRenderer;
pub use ring::FrameRing;
pub use schedule::{FrameScheduler, FrameTicket};
