use anyhow::{ensure, Result};

use crate::math::{ColorRgba, Perspective, Vec3};

use super::GridDims;

/// Size of the procedurally generated texture, in texels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureSize {
    pub width: u32,
    pub height: u32,
}

impl TextureSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    #[inline]
    pub const fn texel_count(self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Static configuration of the cube field.
///
/// Defaults reproduce the reference scene: a 10x10x10 lattice rendered with
/// three frames in flight and a 128x128 fractal texture.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub grid: GridDims,

    /// Number of per-frame buffer copies, and gate capacity.
    pub ring_depth: usize,

    pub texture_size: TextureSize,

    /// Uniform scale applied to each cube; also half the lattice spacing.
    pub cell_scale: f32,

    /// Global angle increment per frame, radians.
    pub angle_step: f32,

    /// World-space pivot of the lattice.
    pub object_position: Vec3,

    pub camera: Perspective,

    pub clear_color: ColorRgba,
    pub clear_depth: f32,
}

impl SceneConfig {
    pub const GRID_ROWS: u32 = 10;
    pub const GRID_COLUMNS: u32 = 10;
    pub const GRID_DEPTH: u32 = 10;
    pub const RING_DEPTH: usize = 3;
    pub const TEXTURE_SIDE: u32 = 128;
    pub const CELL_SCALE: f32 = 0.2;
    pub const ANGLE_STEP: f32 = 0.002;

    /// Checks the invariants the renderer relies on.
    pub fn validate(&self) -> Result<()> {
        let GridDims { rows, columns, depth } = self.grid;
        ensure!(rows > 0 && columns > 0 && depth > 0, "grid dimensions must be non-zero: {:?}", self.grid);
        ensure!(
            self.grid.checked_instance_count().is_some(),
            "grid {:?} exceeds the u32 instance range",
            self.grid
        );
        ensure!(self.ring_depth > 0, "ring depth must be at least 1");
        ensure!(
            self.texture_size.width > 0 && self.texture_size.height > 0,
            "texture size must be non-zero: {:?}",
            self.texture_size
        );
        ensure!(
            self.cell_scale.is_finite() && self.cell_scale > 0.0,
            "cell scale must be positive, got {}",
            self.cell_scale
        );
        ensure!(self.angle_step.is_finite(), "angle step must be finite");
        ensure!(self.object_position.is_finite(), "object position must be finite");
        ensure!(
            self.camera.z_near > 0.0 && self.camera.z_far > self.camera.z_near,
            "camera planes must satisfy 0 < near < far (near {}, far {})",
            self.camera.z_near,
            self.camera.z_far
        );
        ensure!(self.clear_color.is_finite(), "clear color must be finite");
        Ok(())
    }

    /// Total number of cube instances drawn per frame.
    #[inline]
    pub fn instance_count(&self) -> u32 {
        self.grid.instance_count()
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid: GridDims::new(Self::GRID_ROWS, Self::GRID_COLUMNS, Self::GRID_DEPTH),
            ring_depth: Self::RING_DEPTH,
            texture_size: TextureSize::square(Self::TEXTURE_SIDE),
            cell_scale: Self::CELL_SCALE,
            angle_step: Self::ANGLE_STEP,
            object_position: Vec3::new(0.0, 0.0, -10.0),
            camera: Perspective {
                fov_y: 45f32.to_radians(),
                aspect: 1.0,
                z_near: 0.03,
                z_far: 500.0,
            },
            clear_color: ColorRgba::gray(0.1),
            clear_depth: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = SceneConfig::default();
        c.validate().unwrap();
        assert_eq!(c.instance_count(), 1000);
        assert_eq!(c.ring_depth, 3);
        assert_eq!(c.texture_size.texel_count(), 128 * 128);
    }

    #[test]
    fn zero_grid_dimension_is_rejected() {
        let c = SceneConfig { grid: GridDims::new(10, 0, 10), ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_ring_depth_is_rejected() {
        let c = SceneConfig { ring_depth: 0, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let c = SceneConfig { grid: GridDims::new(u32::MAX, 2, 1), ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn inverted_camera_planes_are_rejected() {
        let mut c = SceneConfig::default();
        c.camera.z_far = c.camera.z_near;
        assert!(c.validate().is_err());
    }
}
