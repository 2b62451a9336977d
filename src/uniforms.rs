// SPDX-License-Identifier: MPL-2.0

//! Per-draw uniform values.

use std::collections::BTreeMap;

use crate::{Matrix3, Matrix4, Vector3, Vector4};

pub const WORLD: &str = "u_world";
pub const WORLD_VIEW_PROJECTION: &str = "u_worldViewProjection";
pub const WORLD_INVERSE_TRANSPOSE: &str = "u_worldInverseTranspose";
pub const LIGHT_WORLD_POSITION: &str = "u_lightWorldPosition";
pub const TEXTURE: &str = "u_texture";
pub const COLOR: &str = "u_color";

/// A single uniform value, shaped like its shader-side declaration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3(Vector3),
    Vec4(Vector4),
    Mat3(Matrix3),
    Mat4(Matrix4),
}

impl UniformValue {
    pub fn as_mat4(&self) -> Option<Matrix4> {
        match *self {
            Self::Mat4(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vector3> {
        match *self {
            Self::Vec3(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_uniform_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from_for_uniform_value!(
    f32 => Float,
    i32 => Int,
    [f32; 2] => Vec2,
    Vector3 => Vec3,
    [f32; 3] => Vec3,
    Vector4 => Vec4,
    [f32; 4] => Vec4,
    Matrix3 => Mat3,
    Matrix4 => Mat4,
);

/// A name-to-value mapping of uniforms, iterated in name order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Uniforms(BTreeMap<String, UniformValue>);

impl Uniforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// The uniforms every object starts with: its three transform matrices, all identity.
    pub fn object_defaults() -> Self {
        let mut this = Self::new();
        this.insert(WORLD_VIEW_PROJECTION, Matrix4::IDENTITY);
        this.insert(WORLD_INVERSE_TRANSPOSE, Matrix4::IDENTITY);
        this.insert(WORLD, Matrix4::IDENTITY);

        this
    }

    /// Sets `name` to `value`, returning the value it replaces.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<UniformValue>,
    ) -> Option<UniformValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.0.get(name)
    }

    pub fn mat4(&self, name: &str) -> Option<Matrix4> {
        self.get(name).and_then(UniformValue::as_mat4)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        self.0.remove(name)
    }

    /// Copies every entry of `other` into `self`, overwriting entries of the same name.
    pub fn merge(&mut self, other: &Self) {
        self.0
            .extend(other.0.iter().map(|(name, value)| (name.clone(), *value)));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<UniformValue>> FromIterator<(K, V)> for Uniforms {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// The per-object transform block as laid out in GPU memory.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectTransformsUniform {
    pub world: [[f32; 4]; 4],
    pub world_view_projection: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
}

impl ObjectTransformsUniform {
    /// Gathers the transform block from `uniforms`, substituting identity for missing entries.
    pub fn from_uniforms(uniforms: &Uniforms) -> Self {
        let get = |name| uniforms.mat4(name).unwrap_or_default().to_cols_array_2d();

        Self {
            world: get(WORLD),
            world_view_projection: get(WORLD_VIEW_PROJECTION),
            world_inverse_transpose: get(WORLD_INVERSE_TRANSPOSE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_defaults() {
        let mut uniforms = Uniforms::object_defaults();
        let custom: Uniforms = [(WORLD, Matrix4::translation(1., 2., 3.))].into_iter().collect();
        uniforms.merge(&custom);
        uniforms.insert(COLOR, [1., 0.5, 0.5, 1.]);

        assert_eq!(uniforms.len(), 4);
        assert_eq!(uniforms.mat4(WORLD), Some(Matrix4::translation(1., 2., 3.)));
        assert_eq!(uniforms.mat4(WORLD_VIEW_PROJECTION), Some(Matrix4::IDENTITY));
        assert_eq!(
            uniforms.get(COLOR),
            Some(&UniformValue::Vec4(Vector4::new(1., 0.5, 0.5, 1.))),
        );
        assert_eq!(uniforms.mat4(COLOR), None);
    }

    #[test]
    fn transforms_block_is_column_major() {
        let mut uniforms = Uniforms::new();
        uniforms.insert(WORLD, Matrix4::translation(4., 5., 6.));

        let block = ObjectTransformsUniform::from_uniforms(&uniforms);

        assert_eq!(block.world[3], [4., 5., 6., 1.]);
        assert_eq!(block.world_view_projection, Matrix4::IDENTITY.to_cols_array_2d());
        assert_eq!(std::mem::size_of::<ObjectTransformsUniform>(), 3 * 64);
    }
}
