//! Math types shared by the scene animator and renderers.
//!
//! Conventions:
//! - Matrices are column-major (`cols[c][r]`) to match WGSL layout
//! - Vectors are columns; `a * b` applies `b` first
//! - Clip space depth is `[0, 1]` (wgpu NDC)

mod color;
mod mat;
mod transform;
mod vec3;

pub use color::ColorRgba;
pub use mat::{Mat3, Mat4};
pub use transform::{
    discard_translation, identity, perspective, rotate_x, rotate_y, rotate_z, scale, translate,
    Perspective,
};
pub use vec3::Vec3;
