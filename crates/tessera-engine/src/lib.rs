//! Tessera engine crate.
//!
//! Renders a 3D field of instanced cubes, textured by a fractal regenerated
//! each frame in a compute pass, with a bounded number of frames in flight.
//!
//! Layers, bottom up:
//! - `math` / `scene`: CPU-only transforms, grid, mesh and animation
//! - `render`: frame admission, compute + raster passes
//! - `device`: wgpu device, surface and submission
//! - `window` / `core`: winit runtime and the application contract

pub mod core;
pub mod device;
pub mod logging;
pub mod math;
pub mod render;
pub mod scene;
pub mod time;
pub mod window;
