// SPDX-License-Identifier: MPL-2.0

//! A scene graph with hierarchical transforms and the per-frame matrix pipeline that feeds a
//! renderer.
//!
//! # Coordinate Spaces
//!
//! There are five coordinate spaces: **mesh** space, **local** space, **world** space, **camera**
//! space, and **clip** space.
//!
//! ## Mesh Space
//!
//! The vertex positions of an [`Object`] are given in mesh space, whose origin is considered the
//! 'center' of the mesh. Objects are scaled and rotated about this origin.
//!
//! ## Local Space
//!
//! Every [node](tree::Node) of the [`SceneGraph`] has a *local matrix* that places it relative to
//! its parent. An object's local matrix maps its mesh space into the space of its parent node.
//!
//! ## World Space
//!
//! Composing local matrices from the root down yields each node's *world matrix*. World matrices
//! are cached and refreshed in one pass per frame by [`SceneGraph::update_world_matrices`]; until
//! that pass runs, they describe the previous frame.
//!
//! ## Camera Space
//!
//! Once all objects are in world space, we transform *the world itself* so that the camera sits
//! at the origin looking down the negative Z axis. The camera is placed with
//! [`Matrix4::look_at`], which yields the camera's own world matrix; the *view matrix* is its
//! inverse.
//!
//! ## Clip Space
//!
//! The projection matrix maps camera space onto the range `[-1, 1]` in all axes. The product of
//! projection, view, and world matrices is the `u_worldViewProjection` uniform of each object.
//!
//! # Frames
//!
//! A [`Scene`] is driven one [`Frame`] at a time: mutate, then [propagate](Frame::propagate),
//! then [render](Frame::render) through a [`Backend`].

pub mod camera;
mod error;
pub mod frame;
pub mod geometry;
pub mod linear;
pub mod object;
pub mod renderer;
mod scene;
pub mod tree;
pub mod uniforms;

pub use camera::{Projection, ViewMatrices, ViewSettings};
pub use error::{Error, Result};
pub use frame::Frame;
pub use linear::{Matrix3, Matrix4, Scalar, Vector3, Vector4};
pub use object::{Axis, Object, ObjectId, ObjectSettings, Primitive, Transform, VertexAttributes};
pub use renderer::{Backend, WgpuBackend};
pub use scene::{Light, LightId, ObjectMut, Scene};
pub use tree::{NodeId, NodeSettings, SceneGraph, TransformSource, Trs};
pub use uniforms::{ObjectTransformsUniform, UniformValue, Uniforms};
