//! Per-frame data written by the animator and read by the raster pass.

use bytemuck::{Pod, Zeroable};

use crate::math::{discard_translation, ColorRgba, Mat4};

/// One cube instance.
///
/// Uploaded as a per-instance vertex stream, so no uniform padding applies.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub transform: [[f32; 4]; 4],
    pub normal_transform: [[f32; 3]; 3],
    pub color: [f32; 4],
}

impl InstanceData {
    const ATTRS: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
        3 => Float32x4, // transform col 0
        4 => Float32x4, // transform col 1
        5 => Float32x4, // transform col 2
        6 => Float32x4, // transform col 3
        7 => Float32x3, // normal col 0
        8 => Float32x3, // normal col 1
        9 => Float32x3, // normal col 2
        10 => Float32x4 // color
    ];

    pub fn new(transform: Mat4, color: ColorRgba) -> Self {
        Self {
            transform: transform.cols,
            normal_transform: discard_translation(&transform).cols,
            color: color.to_array(),
        }
    }

    pub fn transform(&self) -> Mat4 {
        Mat4::from_cols(self.transform)
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Camera uniform. Matches `CameraData` in `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    pub perspective: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    /// `mat3x3<f32>` with vec4 column stride.
    pub world_normal: [[f32; 4]; 3],
}

impl CameraData {
    pub fn new(perspective: Mat4, world: Mat4) -> Self {
        Self {
            perspective: perspective.cols,
            world: world.cols,
            world_normal: discard_translation(&world).to_padded_cols(),
        }
    }

    pub fn world(&self) -> Mat4 {
        Mat4::from_cols(self.world)
    }
}

/// CPU-side contents of one ring slot.
#[derive(Debug, Clone)]
pub struct FrameSlot {
    pub instances: Vec<InstanceData>,
    pub camera: CameraData,
}

impl FrameSlot {
    /// Zeroed slot sized for `instance_count` instances.
    pub fn new(instance_count: u32) -> Self {
        Self {
            instances: vec![InstanceData::zeroed(); instance_count as usize],
            camera: CameraData::zeroed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{translate, Mat3, Vec3};

    #[test]
    fn gpu_struct_sizes() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 64 + 36 + 16);
        // WGSL: mat4x4 + mat4x4 + mat3x3 (48 bytes) = 176, 16-byte aligned.
        assert_eq!(std::mem::size_of::<CameraData>(), 176);
        assert_eq!(std::mem::size_of::<CameraData>() % 16, 0);
    }

    #[test]
    fn instance_normal_transform_drops_translation() {
        let t = translate(Vec3::new(3.0, 4.0, 5.0));
        let inst = InstanceData::new(t, ColorRgba::gray(1.0));
        assert_eq!(inst.normal_transform, Mat3::IDENTITY.cols);
        assert_eq!(inst.transform(), t);
    }

    #[test]
    fn identity_camera_normal_is_padded_identity() {
        let cam = CameraData::new(Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(cam.world_normal[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(cam.world_normal[2], [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn new_slot_is_sized_for_grid() {
        let slot = FrameSlot::new(27);
        assert_eq!(slot.instances.len(), 27);
    }
}
