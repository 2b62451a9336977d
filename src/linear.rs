// SPDX-License-Identifier: MPL-2.0

//! Linear algebra definitions.
//!
//! All types here are small `Copy` values, and every operation returns a new value rather than
//! mutating its operands.
//!
//! # Storage
//!
//! Matrices are stored column by column: the entry at row `r` and column `c` of a [`Matrix4`]
//! lives at flat index `c * 4 + r`. The translation of an affine [`Matrix4`] therefore occupies
//! indices 12, 13, and 14, and the flat array can be handed to the GPU unchanged.
//!
//! Products compose right-to-left: `a * b` applied to a vector has the same effect as applying
//! `b` first and then `a`.

mod matrix3;
mod matrix4;
mod vector;

pub use matrix3::Matrix3;
pub use matrix4::Matrix4;
pub use vector::{Vector3, Vector4};

pub type Scalar = f32;

/// Lengths below this are treated as zero by [`Vector3::normalize`] and [`Vector4::normalize`].
pub const NORMALIZE_EPSILON: Scalar = 0.00001;

#[cfg(test)]
pub(crate) fn approx_eq(a: Scalar, b: Scalar) -> bool {
    (a - b).abs() < 1e-4
}
