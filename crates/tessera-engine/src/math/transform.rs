//! Affine and projective transform builders.
//!
//! Rotation matrices follow the renderer's established handedness: a positive
//! angle turns the scene clockwise when looking down the rotation axis.

use super::{Mat3, Mat4, Vec3};

/// Perspective projection parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Perspective {
    /// Vertical field of view, radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

#[inline]
pub const fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// Right-handed perspective mapping view-space depth `[-near, -far]` to
/// clip depth `[0, 1]`.
pub fn perspective(p: Perspective) -> Mat4 {
    let ys = 1.0 / (p.fov_y * 0.5).tan();
    let xs = ys / p.aspect;
    let zs = p.z_far / (p.z_near - p.z_far);
    Mat4::from_rows([
        [xs, 0.0, 0.0, 0.0],
        [0.0, ys, 0.0, 0.0],
        [0.0, 0.0, zs, p.z_near * zs],
        [0.0, 0.0, -1.0, 0.0],
    ])
}

pub fn rotate_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_rows([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, s, 0.0],
        [0.0, -s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

pub fn rotate_y(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_rows([
        [c, 0.0, s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

pub fn rotate_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_rows([
        [c, s, 0.0, 0.0],
        [-s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

pub fn translate(v: Vec3) -> Mat4 {
    Mat4::from_cols([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [v.x, v.y, v.z, 1.0],
    ])
}

pub fn scale(v: Vec3) -> Mat4 {
    Mat4::from_cols([
        [v.x, 0.0, 0.0, 0.0],
        [0.0, v.y, 0.0, 0.0],
        [0.0, 0.0, v.z, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ])
}

/// Upper-left 3x3 of `m`: the part that applies to normals.
///
/// The translation column never contributes.
pub fn discard_translation(m: &Mat4) -> Mat3 {
    let xyz = |c: [f32; 4]| [c[0], c[1], c[2]];
    Mat3::from_cols([xyz(m.cols[0]), xyz(m.cols[1]), xyz(m.cols[2])])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    // ── translate / scale ─────────────────────────────────────────────────

    #[test]
    fn translate_moves_points_not_directions() {
        let t = translate(Vec3::new(1.0, -2.0, 3.0));
        assert_eq!(t.mul_vec4([0.0, 0.0, 0.0, 1.0]), [1.0, -2.0, 3.0, 1.0]);
        assert_eq!(t.mul_vec4([1.0, 0.0, 0.0, 0.0]), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn scale_is_per_axis() {
        let s = scale(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(s.mul_vec4([1.0, 1.0, 1.0, 1.0]), [2.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn translate_then_inverse_is_identity() {
        let v = Vec3::new(0.0, 0.0, -10.0);
        assert_eq!(translate(v) * translate(-v), Mat4::IDENTITY);
    }

    // ── rotations ─────────────────────────────────────────────────────────

    #[test]
    fn zero_rotation_is_identity() {
        assert_eq!(rotate_x(0.0), Mat4::IDENTITY);
        assert_eq!(rotate_y(0.0), Mat4::IDENTITY);
        assert_eq!(rotate_z(0.0), Mat4::IDENTITY);
    }

    #[test]
    fn rotations_keep_their_axis() {
        let p = FRAC_PI_4;
        assert!(close(rotate_x(p).mul_vec4([1.0, 0.0, 0.0, 0.0]), [1.0, 0.0, 0.0, 0.0]));
        assert!(close(rotate_y(p).mul_vec4([0.0, 1.0, 0.0, 0.0]), [0.0, 1.0, 0.0, 0.0]));
        assert!(close(rotate_z(p).mul_vec4([0.0, 0.0, 1.0, 0.0]), [0.0, 0.0, 1.0, 0.0]));
    }

    #[test]
    fn quarter_turns_follow_renderer_handedness() {
        let q = FRAC_PI_2;
        assert!(close(rotate_z(q).mul_vec4([1.0, 0.0, 0.0, 0.0]), [0.0, -1.0, 0.0, 0.0]));
        assert!(close(rotate_y(q).mul_vec4([1.0, 0.0, 0.0, 0.0]), [0.0, 0.0, -1.0, 0.0]));
        assert!(close(rotate_x(q).mul_vec4([0.0, 1.0, 0.0, 0.0]), [0.0, 0.0, -1.0, 0.0]));
    }

    #[test]
    fn opposite_angles_cancel() {
        let a = 0.7;
        assert!((rotate_y(a) * rotate_y(-a)).max_abs_diff(&Mat4::IDENTITY) < 1e-6);
        assert!((rotate_x(a) * rotate_x(-a)).max_abs_diff(&Mat4::IDENTITY) < 1e-6);
    }

    // ── perspective ───────────────────────────────────────────────────────

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth() {
        let p = perspective(Perspective {
            fov_y: 45f32.to_radians(),
            aspect: 1.0,
            z_near: 0.03,
            z_far: 500.0,
        });

        let near = p.mul_vec4([0.0, 0.0, -0.03, 1.0]);
        let far = p.mul_vec4([0.0, 0.0, -500.0, 1.0]);
        assert!((near[2] / near[3]).abs() < 1e-5);
        assert!((far[2] / far[3] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn perspective_divides_by_view_depth() {
        let p = perspective(Perspective { fov_y: FRAC_PI_2, aspect: 2.0, z_near: 1.0, z_far: 10.0 });
        // fov 90° → ys = 1, xs = ys / aspect.
        assert!((p.at(0, 0) - 0.5).abs() < 1e-6);
        assert!((p.at(1, 1) - 1.0).abs() < 1e-6);
        assert_eq!(p.at(3, 2), -1.0);
        assert_eq!(p.at(3, 3), 0.0);
    }

    // ── discard_translation ───────────────────────────────────────────────

    #[test]
    fn discard_translation_ignores_translation_column() {
        let base = rotate_y(0.3) * scale(Vec3::new(1.0, 2.0, 0.5));
        let a = translate(Vec3::new(5.0, -1.0, 9.0)) * base;
        let b = translate(Vec3::new(-300.0, 7.0, 0.0)) * base;

        let na = discard_translation(&a);
        assert_eq!(na, discard_translation(&b));
        assert_eq!(na, discard_translation(&base));
        for c in 0..3 {
            for r in 0..3 {
                assert_eq!(na.cols[c][r], a.cols[c][r]);
            }
        }
    }

    #[test]
    fn identity_normal_transform_is_identity() {
        assert_eq!(discard_translation(&identity()), Mat3::IDENTITY);
    }
}
