use std::f32::consts::TAU;

use crate::math::{
    identity, perspective, rotate_x, rotate_y, rotate_z, scale, translate, ColorRgba, Mat4,
    Perspective, Vec3,
};

use super::{CameraData, FrameSlot, GridCell, GridDims, InstanceData, SceneConfig};

/// Recomputes instance and camera data once per frame.
///
/// Owns the global animation angle. The angle only ever grows by
/// `angle_step` per call to [`animate`](Self::animate).
#[derive(Debug, Clone)]
pub struct SceneAnimator {
    angle: f32,
    angle_step: f32,
    grid: GridDims,
    cell_scale: f32,
    object_position: Vec3,
    camera: Perspective,
}

impl SceneAnimator {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            angle: 0.0,
            angle_step: config.angle_step,
            grid: config.grid,
            cell_scale: config.cell_scale,
            object_position: config.object_position,
            camera: config.camera,
        }
    }

    /// Angle used by the most recent frame.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn grid(&self) -> GridDims {
        self.grid
    }

    /// Advances the angle and overwrites every record in `slot`.
    pub fn animate(&mut self, slot: &mut FrameSlot) {
        self.angle += self.angle_step;
        let angle = self.angle;

        let count = self.grid.instance_count();
        debug_assert_eq!(slot.instances.len(), count as usize);

        let object = self.object_transform(angle);
        for (cell, record) in self.grid.cells().zip(slot.instances.iter_mut()) {
            *record = InstanceData::new(
                self.instance_transform(&object, cell, angle),
                Self::instance_color(cell.index, count),
            );
        }

        slot.camera = self.camera_data();
        log::trace!("animated {count} instances at angle {angle:.4}");
    }

    /// Rigid spin of the whole lattice about its own pivot.
    pub fn object_transform(&self, angle: f32) -> Mat4 {
        let p = self.object_position;
        translate(p) * rotate_y(-angle) * rotate_x(angle * 0.5) * translate(-p)
    }

    /// World-space center of `cell`, offset so the lattice surrounds the pivot.
    pub fn cell_position(&self, cell: GridCell) -> Vec3 {
        let s = self.cell_scale;
        let spacing = 2.0 * s;
        let x = (cell.ix as f32 - self.grid.rows as f32 / 2.0) * spacing + s;
        let y = (cell.iy as f32 - self.grid.columns as f32 / 2.0) * spacing + s;
        let z = (cell.iz as f32 - self.grid.depth as f32 / 2.0) * spacing;
        self.object_position + Vec3::new(x, y, z)
    }

    pub fn instance_transform(&self, object: &Mat4, cell: GridCell, angle: f32) -> Mat4 {
        let spin_y = rotate_y(angle * (cell.iy as f32).cos());
        let spin_z = rotate_z(angle * (cell.ix as f32).sin());
        *object
            * translate(self.cell_position(cell))
            * spin_y
            * spin_z
            * scale(Vec3::splat(self.cell_scale))
    }

    /// Gradient over the linear instance index; independent of time.
    pub fn instance_color(index: u32, count: u32) -> ColorRgba {
        let t = index as f32 / count as f32;
        ColorRgba::new(t, 1.0 - t, (TAU * t).sin(), 1.0)
    }

    pub fn camera_data(&self) -> CameraData {
        CameraData::new(perspective(self.camera), identity())
    }
}
