//! Scene description and per-frame animation.
//!
//! The scene is a fixed cube mesh instanced over a 3D grid. Everything here
//! is CPU-only; `render` uploads what this module produces.

mod animator;
mod config;
mod frame;
mod grid;
mod mesh;

pub use animator::SceneAnimator;
pub use config::{SceneConfig, TextureSize};
pub use frame::{CameraData, FrameSlot, InstanceData};
pub use grid::{GridCell, GridCells, GridDims};
pub use mesh::{cube_indices, cube_vertices, Vertex, CUBE_HALF_EXTENT, CUBE_INDEX_COUNT};
