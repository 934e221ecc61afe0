use core::ops::Mul;

/// 4x4 column-major matrix.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4::from_cols([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    #[inline]
    pub const fn from_cols(cols: [[f32; 4]; 4]) -> Self {
        Self { cols }
    }

    /// Builds a matrix from rows, the way transforms are usually written down.
    #[inline]
    pub const fn from_rows(rows: [[f32; 4]; 4]) -> Self {
        let mut cols = [[0.0; 4]; 4];
        let mut r = 0;
        while r < 4 {
            let mut c = 0;
            while c < 4 {
                cols[c][r] = rows[r][c];
                c += 1;
            }
            r += 1;
        }
        Self { cols }
    }

    /// Element at row `r`, column `c`.
    #[inline]
    pub const fn at(&self, r: usize, c: usize) -> f32 {
        self.cols[c][r]
    }

    /// Transforms a column vector.
    pub fn mul_vec4(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (c, col) in self.cols.iter().enumerate() {
            for (r, o) in out.iter_mut().enumerate() {
                *o += col[r] * v[c];
            }
        }
        out
    }

    /// Largest absolute element-wise difference to `other`.
    pub fn max_abs_diff(&self, other: &Mat4) -> f32 {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }

    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut cols = [[0.0; 4]; 4];
        for (c, out) in cols.iter_mut().enumerate() {
            *out = self.mul_vec4(rhs.cols[c]);
        }
        Mat4 { cols }
    }
}

/// 3x3 column-major matrix (rotation/scale part of an affine transform).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub cols: [[f32; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3::from_cols([
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ]);

    #[inline]
    pub const fn from_cols(cols: [[f32; 3]; 3]) -> Self {
        Self { cols }
    }

    /// Columns widened to `vec4` stride, as WGSL lays out `mat3x3<f32>` in
    /// uniform and storage buffers.
    #[inline]
    pub const fn to_padded_cols(self) -> [[f32; 4]; 3] {
        let [a, b, c] = self.cols;
        [
            [a[0], a[1], a[2], 0.0],
            [b[0], b[1], b[2], 0.0],
            [c[0], c[1], c[2], 0.0],
        ]
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}
