// SPDX-License-Identifier: MPL-2.0

use std::{fmt, ops::{Index, IndexMut, Mul}};

use super::{Scalar, Vector3, Vector4};

impl Matrix4 {
    /// Creates a matrix from its entries given row by row.
    ///
    /// The entries are stored column by column, so `r0c3` (the X translation) lands at index 12.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        r0c0: Scalar,
        r0c1: Scalar,
        r0c2: Scalar,
        r0c3: Scalar,
        r1c0: Scalar,
        r1c1: Scalar,
        r1c2: Scalar,
        r1c3: Scalar,
        r2c0: Scalar,
        r2c1: Scalar,
        r2c2: Scalar,
        r2c3: Scalar,
        r3c0: Scalar,
        r3c1: Scalar,
        r3c2: Scalar,
        r3c3: Scalar,
    ) -> Self {
        Self([
            r0c0, r1c0, r2c0, r3c0,
            r0c1, r1c1, r2c1, r3c1,
            r0c2, r1c2, r2c2, r3c2,
            r0c3, r1c3, r2c3, r3c3,
        ])
    }

    /// Creates a matrix from an array of rows.
    pub fn from_rows(rows: [[Scalar; 4]; 4]) -> Self {
        Self(std::array::from_fn(|i| rows[i % 4][i / 4]))
    }

    /// Creates a matrix from its flat, column-by-column entries.
    pub const fn from_cols_array(entries: [Scalar; 16]) -> Self {
        Self(entries)
    }
}

/// A 4x4 square matrix of `Scalar`s.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix4(pub [Scalar; 16]);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    pub const ZERO: Self = Self::new(
        0., 0., 0., 0.,
        0., 0., 0., 0.,
        0., 0., 0., 0.,
        0., 0., 0., 0.,
    );

    pub const IDENTITY: Self = Self::new(
        1., 0., 0., 0.,
        0., 1., 0., 0.,
        0., 0., 1., 0.,
        0., 0., 0., 1.,
    );

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// The entry at `row` and `column`.
    pub const fn get(&self, row: usize, column: usize) -> Scalar {
        self.0[column * 4 + row]
    }

    pub fn set(&mut self, row: usize, column: usize, value: Scalar) {
        self.0[column * 4 + row] = value;
    }

    pub const fn to_cols_array(&self) -> [Scalar; 16] {
        self.0
    }

    /// The columns of this matrix, in the layout shaders expect for a `mat4x4`.
    pub fn to_cols_array_2d(&self) -> [[Scalar; 4]; 4] {
        std::array::from_fn(|c| std::array::from_fn(|r| self.0[c * 4 + r]))
    }

    pub fn column(&self, column: usize) -> Vector4 {
        Vector4(std::array::from_fn(|r| self.0[column * 4 + r]))
    }

    pub fn row(&self, row: usize) -> Vector4 {
        Vector4(std::array::from_fn(|c| self.0[c * 4 + row]))
    }

    /// The translation part of this matrix.
    pub const fn location(&self) -> Vector3 {
        Vector3::new(self.0[12], self.0[13], self.0[14])
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|e| e.is_finite())
    }

    /// Composes two matrices.
    ///
    /// Applying the result to a vector is equivalent to applying `rhs` first and then `self`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let (a, b) = (&self.0, &rhs.0);

        Self(std::array::from_fn(|i| {
            let (column, row) = (i / 4, i % 4);

            (0..4).map(|k| a[k * 4 + row] * b[column * 4 + k]).sum()
        }))
    }

    pub fn transpose(&self) -> Self {
        Self(std::array::from_fn(|i| self.0[(i % 4) * 4 + i / 4]))
    }

    /// The 2x2 minors shared by [`Self::determinant`] and [`Self::inverse`].
    ///
    /// The first six come from the first two columns, the last six from the last two.
    fn minors(&self) -> [Scalar; 12] {
        let m = &self.0;
        let (a00, a01, a02, a03) = (m[0], m[1], m[2], m[3]);
        let (a10, a11, a12, a13) = (m[4], m[5], m[6], m[7]);
        let (a20, a21, a22, a23) = (m[8], m[9], m[10], m[11]);
        let (a30, a31, a32, a33) = (m[12], m[13], m[14], m[15]);

        [
            a00 * a11 - a01 * a10,
            a00 * a12 - a02 * a10,
            a00 * a13 - a03 * a10,
            a01 * a12 - a02 * a11,
            a01 * a13 - a03 * a11,
            a02 * a13 - a03 * a12,
            a20 * a31 - a21 * a30,
            a20 * a32 - a22 * a30,
            a20 * a33 - a23 * a30,
            a21 * a32 - a22 * a31,
            a21 * a33 - a23 * a31,
            a22 * a33 - a23 * a32,
        ]
    }

    pub fn determinant(&self) -> Scalar {
        let [b00, b01, b02, b03, b04, b05, b06, b07, b08, b09, b10, b11] = self.minors();

        b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06
    }

    /// The inverse of this matrix, by cofactor expansion over the adjugate.
    ///
    /// No check is made for singular input: a zero determinant yields infinite or NaN entries.
    /// Use [`Self::try_inverse`] where that matters.
    pub fn inverse(&self) -> Self {
        let m = &self.0;
        let (a00, a01, a02, a03) = (m[0], m[1], m[2], m[3]);
        let (a10, a11, a12, a13) = (m[4], m[5], m[6], m[7]);
        let (a20, a21, a22, a23) = (m[8], m[9], m[10], m[11]);
        let (a30, a31, a32, a33) = (m[12], m[13], m[14], m[15]);
        let [b00, b01, b02, b03, b04, b05, b06, b07, b08, b09, b10, b11] = self.minors();

        let det = b00 * b11 - b01 * b10 + b02 * b09 + b03 * b08 - b04 * b07 + b05 * b06;
        let inv = 1. / det;

        Self([
            (a11 * b11 - a12 * b10 + a13 * b09) * inv,
            (a02 * b10 - a01 * b11 - a03 * b09) * inv,
            (a31 * b05 - a32 * b04 + a33 * b03) * inv,
            (a22 * b04 - a21 * b05 - a23 * b03) * inv,
            (a12 * b08 - a10 * b11 - a13 * b07) * inv,
            (a00 * b11 - a02 * b08 + a03 * b07) * inv,
            (a32 * b02 - a30 * b05 - a33 * b01) * inv,
            (a20 * b05 - a22 * b02 + a23 * b01) * inv,
            (a10 * b10 - a11 * b08 + a13 * b06) * inv,
            (a01 * b08 - a00 * b10 - a03 * b06) * inv,
            (a30 * b04 - a31 * b02 + a33 * b00) * inv,
            (a21 * b02 - a20 * b04 - a23 * b00) * inv,
            (a11 * b07 - a10 * b09 - a12 * b06) * inv,
            (a00 * b09 - a01 * b07 + a02 * b06) * inv,
            (a31 * b01 - a30 * b03 - a32 * b00) * inv,
            (a20 * b03 - a21 * b01 + a22 * b00) * inv,
        ])
    }

    /// The inverse of this matrix, or `None` if it is singular.
    pub fn try_inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < Scalar::EPSILON {
            return None;
        }

        Some(self.inverse())
    }
}

impl Matrix4 {
    pub const fn translation(tx: Scalar, ty: Scalar, tz: Scalar) -> Self {
        Self::new(
            1., 0., 0., tx,
            0., 1., 0., ty,
            0., 0., 1., tz,
            0., 0., 0., 1.,
        )
    }

    pub const fn scaling(sx: Scalar, sy: Scalar, sz: Scalar) -> Self {
        Self::new(
            sx, 0., 0., 0.,
            0., sy, 0., 0.,
            0., 0., sz, 0.,
            0., 0., 0., 1.,
        )
    }

    pub fn x_rotation(radians: Scalar) -> Self {
        let SinCos { sin: s, cos: c } = SinCos::new(radians);

        Self::new(
            1., 0., 0., 0.,
            0.,  c, -s, 0.,
            0.,  s,  c, 0.,
            0., 0., 0., 1.,
        )
    }

    pub fn y_rotation(radians: Scalar) -> Self {
        let SinCos { sin: s, cos: c } = SinCos::new(radians);

        Self::new(
             c, 0.,  s, 0.,
            0., 1., 0., 0.,
            -s, 0.,  c, 0.,
            0., 0., 0., 1.,
        )
    }

    pub fn z_rotation(radians: Scalar) -> Self {
        let SinCos { sin: s, cos: c } = SinCos::new(radians);

        Self::new(
             c, -s, 0., 0.,
             s,  c, 0., 0.,
            0., 0., 1., 0.,
            0., 0., 0., 1.,
        )
    }

    /// A rotation of `radians` about the axis `(x, y, z)`.
    ///
    /// The axis is *not* normalized. Its length `|r|` scales the sine terms while the squared
    /// components feed the diagonal, so only a unit axis yields a pure rotation. A non-unit axis
    /// of length `k` produces `k²` times the rotation about the normalized axis.
    pub fn axis_rotation(radians: Scalar, x: Scalar, y: Scalar, z: Scalar) -> Self {
        let SinCos { sin: s, cos: c } = SinCos::new(radians);
        let r = (x * x + y * y + z * z).sqrt();

        Self::new(
            x * x + (y * y + z * z) * c,
            x * y - x * y * c - r * z * s,
            x * z - x * z * c + r * y * s,
            0.,

            x * y - x * y * c + r * z * s,
            y * y + (x * x + z * z) * c,
            y * z - y * z * c - r * x * s,
            0.,

            x * z - x * z * c - r * y * s,
            y * z - y * z * c + r * x * s,
            z * z + (x * x + y * y) * c,
            0.,

            0., 0., 0., 1.,
        )
    }

    /// `self` followed, in local space, by a translation.
    pub fn translate(&self, tx: Scalar, ty: Scalar, tz: Scalar) -> Self {
        self.multiply(&Self::translation(tx, ty, tz))
    }

    pub fn scale(&self, sx: Scalar, sy: Scalar, sz: Scalar) -> Self {
        self.multiply(&Self::scaling(sx, sy, sz))
    }

    pub fn x_rotate(&self, radians: Scalar) -> Self {
        self.multiply(&Self::x_rotation(radians))
    }

    pub fn y_rotate(&self, radians: Scalar) -> Self {
        self.multiply(&Self::y_rotation(radians))
    }

    pub fn z_rotate(&self, radians: Scalar) -> Self {
        self.multiply(&Self::z_rotation(radians))
    }

    pub fn axis_rotate(&self, radians: Scalar, x: Scalar, y: Scalar, z: Scalar) -> Self {
        self.multiply(&Self::axis_rotation(radians, x, y, z))
    }
}

impl Matrix4 {
    /// A symmetric perspective projection.
    ///
    /// Passing `far = Scalar::INFINITY` selects the infinite far plane, where the depth row
    /// becomes `[0, 0, -1, -2 * near]`.
    pub fn perspective(fov_y: Scalar, aspect: Scalar, near: Scalar, far: Scalar) -> Self {
        let f = 1. / (fov_y / 2.).tan();

        let (depth_scale, depth_offset) = if far.is_finite() {
            let nf = 1. / (near - far);
            ((far + near) * nf, 2. * far * near * nf)
        } else {
            (-1., -2. * near)
        };

        Self::new(
            f / aspect, 0.,          0.,           0.,
            0.,          f,          0.,           0.,
            0.,         0., depth_scale, depth_offset,
            0.,         0.,         -1.,           0.,
        )
    }

    pub fn orthographic(
        left: Scalar,
        right: Scalar,
        bottom: Scalar,
        top: Scalar,
        near: Scalar,
        far: Scalar,
    ) -> Self {
        Self::new(
            2. / (right - left), 0., 0., (left + right) / (left - right),
            0., 2. / (top - bottom), 0., (bottom + top) / (bottom - top),
            0., 0., 2. / (near - far), (near + far) / (near - far),
            0., 0., 0., 1.,
        )
    }

    /// Maps pixel coordinates (origin top-left, Y down) to clip space.
    pub fn projection(width: Scalar, height: Scalar, depth: Scalar) -> Self {
        Self::new(
            2. / width,            0.,         0., -1.,
                    0., -2. / height,         0.,  1.,
                    0.,            0., 2. / depth,  0.,
                    0.,            0.,         0.,  1.,
        )
    }

    /// The world matrix of a camera at `eye` facing `target`.
    ///
    /// This is not a view matrix; invert it to obtain one.
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Self {
        let z_axis = eye.subtract(target).normalize();
        let x_axis = up.cross(z_axis).normalize();
        let y_axis = z_axis.cross(x_axis).normalize();

        Self::new(
            x_axis[0], y_axis[0], z_axis[0], eye[0],
            x_axis[1], y_axis[1], z_axis[1], eye[1],
            x_axis[2], y_axis[2], z_axis[2], eye[2],
                   0.,        0.,        0.,     1.,
        )
    }
}

impl Matrix4 {
    pub fn transform_vector(&self, v: Vector4) -> Vector4 {
        Vector4(std::array::from_fn(|row| {
            (0..4).map(|k| v[k] * self.0[k * 4 + row]).sum()
        }))
    }

    /// Transforms a point, dividing through by the resulting `w`.
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        let [x, y, z, w] = self.transform_vector(p.to_point()).to_array();

        Vector3::new(x / w, y / w, z / w)
    }

    /// Transforms a direction, ignoring the translation part.
    pub fn transform_direction(&self, d: Vector3) -> Vector3 {
        self.transform_vector(d.to_direction()).truncate()
    }

    /// Transforms a surface normal by the inverse transpose of this matrix.
    pub fn transform_normal(&self, n: Vector3) -> Vector3 {
        self.inverse().transpose().transform_direction(n)
    }
}

impl Index<usize> for Matrix4 {
    type Output = Scalar;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Matrix4 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Mul<Self> for Matrix4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}

impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;

    fn mul(self, rhs: Vector4) -> Self::Output {
        self.transform_vector(rhs)
    }
}

impl fmt::Display for Matrix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            let [a, b, c, d] = self.row(row).to_array();
            writeln!(f, "[{a:>10.4}, {b:>10.4}, {c:>10.4}, {d:>10.4}]")?;
        }

        Ok(())
    }
}

impl SinCos {
    fn new(radians: Scalar) -> Self {
        Self {
            sin: radians.sin(),
            cos: radians.cos(),
        }
    }
}

struct SinCos {
    sin: Scalar,
    cos: Scalar,
}
