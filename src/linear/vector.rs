// SPDX-License-Identifier: MPL-2.0

use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub};

use super::{Scalar, NORMALIZE_EPSILON};

impl Vector3 {
    pub const fn new(x: Scalar, y: Scalar, z: Scalar) -> Self {
        Self([x, y, z])
    }
}

/// A 3x1 column matrix of `Scalar`s.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector3(pub [Scalar; 3]);

impl Vector3 {
    pub const ZERO: Self = Self::new(0., 0., 0.);
    pub const ONE: Self = Self::new(1., 1., 1.);
    pub const X: Self = Self::new(1., 0., 0.);
    pub const Y: Self = Self::new(0., 1., 0.);
    pub const Z: Self = Self::new(0., 0., 1.);

    /// A vector with all three components set to `value`.
    pub const fn splat(value: Scalar) -> Self {
        Self([value; 3])
    }

    pub const fn to_array(self) -> [Scalar; 3] {
        self.0
    }

    pub const fn x(self) -> Scalar {
        self.0[0]
    }

    pub const fn y(self) -> Scalar {
        self.0[1]
    }

    pub const fn z(self) -> Scalar {
        self.0[2]
    }

    pub fn add(self, rhs: Self) -> Self {
        Self([self.0[0] + rhs.0[0], self.0[1] + rhs.0[1], self.0[2] + rhs.0[2]])
    }

    pub fn subtract(self, rhs: Self) -> Self {
        Self([self.0[0] - rhs.0[0], self.0[1] - rhs.0[1], self.0[2] - rhs.0[2]])
    }

    pub fn scalar_multiply(self, factor: Scalar) -> Self {
        Self(self.0.map(|c| c * factor))
    }

    pub fn dot(self, rhs: Self) -> Scalar {
        self.0[0] * rhs.0[0] + self.0[1] * rhs.0[1] + self.0[2] * rhs.0[2]
    }

    pub fn cross(self, rhs: Self) -> Self {
        let [a0, a1, a2] = self.0;
        let [b0, b1, b2] = rhs.0;

        Self([
            a1 * b2 - a2 * b1,
            a2 * b0 - a0 * b2,
            a0 * b1 - a1 * b0,
        ])
    }

    pub fn length(self) -> Scalar {
        self.dot(self).sqrt()
    }

    pub fn distance(self, rhs: Self) -> Scalar {
        self.subtract(rhs).length()
    }

    /// This vector scaled to unit length.
    ///
    /// Vectors shorter than [`NORMALIZE_EPSILON`] normalize to [`Vector3::ZERO`].
    pub fn normalize(self) -> Self {
        let length = self.length();
        if length > NORMALIZE_EPSILON {
            self.scalar_multiply(1. / length)
        } else {
            Self::ZERO
        }
    }

    pub fn lerp(self, rhs: Self, t: Scalar) -> Self {
        self.add(rhs.subtract(self).scalar_multiply(t))
    }

    pub fn is_finite(self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Extends this vector to a homogeneous point (`w = 1`).
    pub const fn to_point(self) -> Vector4 {
        Vector4::new(self.0[0], self.0[1], self.0[2], 1.)
    }

    /// Extends this vector to a homogeneous direction (`w = 0`).
    pub const fn to_direction(self) -> Vector4 {
        Vector4::new(self.0[0], self.0[1], self.0[2], 0.)
    }
}

impl From<[Scalar; 3]> for Vector3 {
    fn from(array: [Scalar; 3]) -> Self {
        Self(array)
    }
}

impl From<Vector3> for [Scalar; 3] {
    fn from(v: Vector3) -> Self {
        v.0
    }
}

impl Index<usize> for Vector3 {
    type Output = Scalar;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Vector3 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Add<Self> for Vector3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Vector3::add(self, rhs)
    }
}

impl Sub<Self> for Vector3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(rhs)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.scalar_multiply(-1.)
    }
}

impl Mul<Scalar> for Vector3 {
    type Output = Self;

    fn mul(self, rhs: Scalar) -> Self::Output {
        self.scalar_multiply(rhs)
    }
}

impl Mul<Vector3> for Scalar {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        // Multiplication with a scalar is commutative.
        rhs * self
    }
}

impl Vector4 {
    pub const fn new(x: Scalar, y: Scalar, z: Scalar, w: Scalar) -> Self {
        Self([x, y, z, w])
    }
}

/// A 4x1 column matrix of `Scalar`s.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vector4(pub [Scalar; 4]);

impl Vector4 {
    pub const ZERO: Self = Self::new(0., 0., 0., 0.);

    pub const fn to_array(self) -> [Scalar; 4] {
        self.0
    }

    /// The first three components, dropping `w` without dividing by it.
    pub const fn truncate(self) -> Vector3 {
        Vector3::new(self.0[0], self.0[1], self.0[2])
    }

    pub fn add(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }

    pub fn subtract(self, rhs: Self) -> Self {
        Self(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }

    pub fn scalar_multiply(self, factor: Scalar) -> Self {
        Self(self.0.map(|c| c * factor))
    }

    pub fn dot(self, rhs: Self) -> Scalar {
        self.0.iter().zip(rhs.0).map(|(a, b)| a * b).sum()
    }

    pub fn length(self) -> Scalar {
        self.dot(self).sqrt()
    }

    /// This vector scaled to unit length.
    ///
    /// Vectors shorter than [`NORMALIZE_EPSILON`] normalize to [`Vector4::ZERO`].
    pub fn normalize(self) -> Self {
        let length = self.length();
        if length > NORMALIZE_EPSILON {
            self.scalar_multiply(1. / length)
        } else {
            Self::ZERO
        }
    }
}

impl From<[Scalar; 4]> for Vector4 {
    fn from(array: [Scalar; 4]) -> Self {
        Self(array)
    }
}

impl Index<usize> for Vector4 {
    type Output = Scalar;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<usize> for Vector4 {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl Add<Self> for Vector4 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Vector4::add(self, rhs)
    }
}

impl Sub<Self> for Vector4 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.subtract(rhs)
    }
}

impl Mul<Scalar> for Vector4 {
    type Output = Self;

    fn mul(self, rhs: Scalar) -> Self::Output {
        self.scalar_multiply(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::approx_eq;

    #[test]
    fn operations_leave_operands_untouched() {
        let a = Vector3::new(1., 2., 3.);
        let b = Vector3::new(4., 5., 6.);

        assert_eq!(a + b, Vector3::new(5., 7., 9.));
        assert_eq!(b - a, Vector3::new(3., 3., 3.));
        assert_eq!(a, Vector3::new(1., 2., 3.));
        assert_eq!(b, Vector3::new(4., 5., 6.));
    }

    #[test]
    fn cross_follows_right_hand_rule() {
        assert_eq!(Vector3::X.cross(Vector3::Y), Vector3::Z);
        assert_eq!(Vector3::Y.cross(Vector3::X), -Vector3::Z);
    }

    #[test]
    fn normalize_zero_vector() {
        assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);
        assert_eq!(Vector4::ZERO.normalize(), Vector4::ZERO);
    }

    #[test]
    fn normalize_has_unit_length() {
        let v = Vector3::new(3., 4., 12.).normalize();
        assert!(approx_eq(v.length(), 1.));
        assert!(approx_eq(v.x(), 3. / 13.));
    }

    #[test]
    fn vector4_dot() {
        let a = Vector4::new(1., 2., 3., 4.);
        assert_eq!(a.dot(a), 30.);
        assert_eq!(a.truncate(), Vector3::new(1., 2., 3.));
    }

    #[test]
    fn lerp_midpoint() {
        let mid = Vector3::ZERO.lerp(Vector3::new(2., 4., 6.), 0.5);
        assert_eq!(mid, Vector3::new(1., 2., 3.));
    }
}
