// SPDX-License-Identifier: MPL-2.0

use std::ops::{Index, IndexMut, Mul};

use super::{Matrix4, Scalar, Vector3};

impl Matrix3 {
    /// Creates a matrix from its entries given row by row.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        r0c0: Scalar,
        r0c1: Scalar,
        r0c2: Scalar,
        r1c0: Scalar,
        r1c1: Scalar,
        r1c2: Scalar,
        r2c0: Scalar,
        r2c1: Scalar,
        r2c2: Scalar,
    ) -> Self {
        Self([
            r0c0, r1c0, r2c0,
            r0c1, r1c1, r2c1,
            r0c2, r1c2, r2c2,
        ])
    }
}

/// A 3x3 square matrix of `Scalar`s.
///
/// Used both for 2D homogeneous transforms and for the linear part of a [`Matrix4`].
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Matrix3(pub [Scalar; 9]);

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix3 {
    pub const IDENTITY: Self = Self::new(
        1., 0., 0.,
        0., 1., 0.,
        0., 0., 1.,
    );

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    pub const fn get(&self, row: usize, column: usize) -> Scalar {
        self.0[column * 3 + row]
    }

    /// The upper-left 3x3 block of `m`.
    pub fn from_matrix4(m: &Matrix4) -> Self {
        Self(std::array::from_fn(|i| m.get(i % 3, i / 3)))
    }

    pub fn multiply(&self, rhs: &Self) -> Self {
        let (a, b) = (&self.0, &rhs.0);

        Self(std::array::from_fn(|i| {
            let (column, row) = (i / 3, i % 3);

            (0..3).map(|k| a[k * 3 + row] * b[column * 3 + k]).sum()
        }))
    }

    pub fn transpose(&self) -> Self {
        Self(std::array::from_fn(|i| self.0[(i % 3) * 3 + i / 3]))
    }

    pub fn determinant(&self) -> Scalar {
        let m = &self.0;

        m[0] * (m[4] * m[8] - m[7] * m[5])
            - m[3] * (m[1] * m[8] - m[7] * m[2])
            + m[6] * (m[1] * m[5] - m[4] * m[2])
    }

    /// The inverse of this matrix. Singular input yields non-finite entries.
    pub fn inverse(&self) -> Self {
        let m = &self.0;
        let inv = 1. / self.determinant();

        Self([
            (m[4] * m[8] - m[7] * m[5]) * inv,
            (m[7] * m[2] - m[1] * m[8]) * inv,
            (m[1] * m[5] - m[4] * m[2]) * inv,
            (m[6] * m[5] - m[3] * m[8]) * inv,
            (m[0] * m[8] - m[6] * m[2]) * inv,
            (m[3] * m[2] - m[0] * m[5]) * inv,
            (m[3] * m[7] - m[6] * m[4]) * inv,
            (m[6] * m[1] - m[0] * m[7]) * inv,
            (m[0] * m[4] - m[3] * m[1]) * inv,
        ])
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        Vector3(std::array::from_fn(|row| {
            (0..3).map(|k| v[k] * self.0[k * 3 + row]).sum()
        }))
    }
}

impl Matrix3 {
    pub const fn translation(tx: Scalar, ty: Scalar) -> Self {
        Self::new(
            1., 0., tx,
            0., 1., ty,
            0., 0., 1.,
        )
    }

    pub fn rotation(radians: Scalar) -> Self {
        let (s, c) = radians.sin_cos();

        Self::new(
             c, -s, 0.,
             s,  c, 0.,
            0., 0., 1.,
        )
    }

    pub const fn scaling(sx: Scalar, sy: Scalar) -> Self {
        Self::new(
            sx, 0., 0.,
            0., sy, 0.,
            0., 0., 1.,
        )
    }

    /// Maps pixel coordinates (origin top-left, Y down) to clip space.
    pub fn projection(width: Scalar, height: Scalar) -> Self {
        Self::new(
            2. / width,           0., -1.,
                    0., -2. / height,  1.,
                    0.,           0.,  1.,
        )
    }

    pub fn translate(&self, tx: Scalar, ty: Scalar) -> Self {
        self.multiply(&Self::translation(tx, ty))
    }

    pub fn rotate(&self, radians: Scalar) -> Self {
        self.multiply(&Self::rotation(radians))
    }

    pub fn scale(&self, sx: Scalar, sy: Scalar) -> Self {
        self.multiply(&Self::scaling(sx, sy))
    }
}

impl Index<usize> for Matrix3 {
    type Output = Scalar;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Matrix3 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Mul<Self> for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.multiply(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::approx_eq;

    #[test]
    fn inverse_law() {
        let m = Matrix3::translation(4., -3.).rotate(0.8).scale(2., 3.);
        let product = m * m.inverse();

        for i in 0..9 {
            assert!(approx_eq(product[i], Matrix3::IDENTITY[i]));
        }
    }

    #[test]
    fn translation_applies_to_points() {
        let p = Matrix3::translation(2., 5.).transform_vector(Vector3::new(1., 1., 1.));
        assert_eq!(p, Vector3::new(3., 6., 1.));
    }

    #[test]
    fn upper_left_block_of_matrix4() {
        let m = Matrix4::scaling(2., 3., 4.).translate(9., 9., 9.);
        let upper = Matrix3::from_matrix4(&m);

        assert_eq!(upper, Matrix3::new(2., 0., 0., 0., 3., 0., 0., 0., 4.));
    }

    #[test]
    fn transpose_is_an_involution() {
        let m = Matrix3::rotation(0.3).translate(1., 2.);
        assert_eq!(m.transpose().transpose(), m);
    }
}
