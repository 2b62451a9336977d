// SPDX-License-Identifier: MPL-2.0

//! Drawable objects.
//!
//! An [`Object`] pairs one scene-graph node with vertex data and the uniforms it is drawn with.
//! Its transform record is applied to the node once, when the object is created; editing the
//! record afterwards does nothing until [`ObjectMut::reapply_transform`] is called.
//!
//! [`ObjectMut::reapply_transform`]: crate::ObjectMut::reapply_transform

use std::ops::Range;

use crate::{tree::Node, Error, NodeId, Result, SceneGraph, Uniforms, Vector3};

/// A handle to an object within a [`Scene`](crate::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// How vertices are assembled into primitives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// The translation, rotation (radians), and scale an object is created with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
        }
    }
}

impl Transform {
    /// Left-multiplies this transform onto `node`, in the order translate, rotate about X, Y,
    /// then Z, and finally scale.
    pub(crate) fn apply_to(&self, node: &mut Node) {
        let [tx, ty, tz] = self.translation.to_array();
        let [rx, ry, rz] = self.rotation.to_array();
        let [sx, sy, sz] = self.scale.to_array();

        node.translate(tx, ty, tz)
            .x_rotate(rx)
            .y_rotate(ry)
            .z_rotate(rz)
            .scale(sx, sy, sz);
    }
}

/// Flat vertex data.
///
/// Positions and normals have a stride of 3, colors 4, and texture coordinates 2.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexAttributes {
    pub position: Vec<f32>,
    pub color: Vec<f32>,
    pub normal: Vec<f32>,
    pub texcoord: Vec<f32>,
    /// A triangle list into the other attributes. Without one, vertices are drawn in order.
    pub indices: Option<Vec<u32>>,
}

impl VertexAttributes {
    pub fn from_positions(position: Vec<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }

    /// The position of vertex `n`.
    pub fn vertex(&self, n: usize) -> Option<Vector3> {
        let p = self.position.get(Self::position_range(n)?)?;

        Some(Vector3::new(p[0], p[1], p[2]))
    }

    fn vertex_mut(&mut self, n: usize) -> Result<&mut [f32]> {
        let count = self.vertex_count();

        Self::position_range(n)
            .and_then(|range| self.position.get_mut(range))
            .ok_or(Error::VertexOutOfRange { index: n, count })
    }

    fn position_range(n: usize) -> Option<Range<usize>> {
        let start = n.checked_mul(3)?;

        Some(start..start.checked_add(3)?)
    }
}

/// The axis-aligned bounds of an object's positions, in mesh space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimensions {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl Dimensions {
    /// Bounds of flat stride-3 position data. Empty data has zero bounds, and trailing values
    /// that do not complete a vertex are ignored.
    pub fn from_positions(position: &[f32]) -> Self {
        let mut vertices = position.chunks_exact(3);
        let Some(first) = vertices.next() else {
            return Self::default();
        };

        let mut min = [first[0], first[1], first[2]];
        let mut max = min;
        for v in vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
        }

        Self {
            x_min: min[0],
            x_max: max[0],
            y_min: min[1],
            y_max: max[1],
            z_min: min[2],
            z_max: max[2],
        }
    }

    pub fn size(&self) -> Vector3 {
        Vector3::new(
            self.x_max - self.x_min,
            self.y_max - self.y_min,
            self.z_max - self.z_min,
        )
    }

    pub fn center(&self) -> Vector3 {
        Vector3::new(
            (self.x_max + self.x_min) / 2.,
            (self.y_max + self.y_min) / 2.,
            (self.z_max + self.z_min) / 2.,
        )
    }
}

/// A pending edit to an object's vertex positions.
#[derive(Clone, Debug, PartialEq)]
pub enum Deformation {
    /// Replaces a whole vertex.
    Vertex { index: usize, position: Vector3 },
    /// Replaces only the listed components of a vertex.
    Components {
        index: usize,
        position: Vector3,
        axes: Vec<Axis>,
    },
}

impl Deformation {
    fn apply(&self, attributes: &mut VertexAttributes) -> Result<()> {
        match self {
            Self::Vertex { index, position } => {
                attributes.vertex_mut(*index)?.copy_from_slice(&position.to_array());
            }
            Self::Components { index, position, axes } => {
                let vertex = attributes.vertex_mut(*index)?;
                for axis in axes {
                    vertex[axis.index()] = position[axis.index()];
                }
            }
        }

        Ok(())
    }
}

/// Parameters for [`Scene::add_object`](crate::Scene::add_object).
#[derive(Clone, Debug, Default)]
pub struct ObjectSettings {
    /// Defaults to `"Object #<n>"`.
    pub name: Option<String>,
    pub transform: Transform,
    /// Defaults to the root.
    pub parent: Option<NodeId>,
    pub primitive: Primitive,
    pub texture: Option<String>,
    /// Marks the object, and its node, as a UI helper rather than scene content.
    pub ui_object: bool,
    pub attributes: VertexAttributes,
    /// Merged over the default transform uniforms.
    pub uniforms: Uniforms,
}

impl ObjectSettings {
    pub fn new(name: impl Into<String>, attributes: VertexAttributes) -> Self {
        Self {
            name: Some(name.into()),
            attributes,
            ..Default::default()
        }
    }

    pub fn translation(mut self, translation: Vector3) -> Self {
        self.transform.translation = translation;
        self
    }

    pub fn rotation(mut self, rotation: Vector3) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vector3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Scales all three axes by `scale`.
    pub fn uniform_scale(self, scale: f32) -> Self {
        self.scale(Vector3::splat(scale))
    }

    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn primitive(mut self, primitive: Primitive) -> Self {
        self.primitive = primitive;
        self
    }

    pub fn texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    pub fn ui_object(mut self, ui_object: bool) -> Self {
        self.ui_object = ui_object;
        self
    }

    pub fn uniforms(mut self, uniforms: Uniforms) -> Self {
        self.uniforms = uniforms;
        self
    }
}

#[derive(Clone, Debug)]
pub struct Object {
    name: String,
    node: NodeId,
    pub(crate) transform: Transform,
    attributes: VertexAttributes,
    pub(crate) uniforms: Uniforms,
    dimensions: Dimensions,
    primitive: Primitive,
    texture: Option<String>,
    ui_object: bool,
    deformations: Vec<Deformation>,
    /// Whether the backend's copy of the vertex data is out of date.
    pub(crate) needs_upload: bool,
}

impl Object {
    /// Creates an object and its node within `graph`.
    pub(crate) fn new(
        default_name: String,
        settings: ObjectSettings,
        graph: &mut SceneGraph,
    ) -> Result<Self> {
        let ObjectSettings {
            name,
            transform,
            parent,
            primitive,
            texture,
            ui_object,
            attributes,
            uniforms: custom_uniforms,
        } = settings;
        let name = name.unwrap_or(default_name);
        if let Some(parent) = parent.filter(|&p| graph.node(p).is_none()) {
            return Err(Error::UnknownNode(parent));
        }

        let node = graph.add_node(name.clone());
        if let Some(parent) = parent {
            graph.set_parent(node, parent)?;
        }
        if let Some(node) = graph.node_mut(node) {
            node.set_ui_node(ui_object);
            transform.apply_to(node);
        }

        let mut uniforms = Uniforms::object_defaults();
        uniforms.merge(&custom_uniforms);

        tracing::debug!(
            "Created object {:?} with {} vertices",
            name,
            attributes.vertex_count(),
        );

        Ok(Self {
            dimensions: Dimensions::from_positions(&attributes.position),
            name,
            node,
            transform,
            attributes,
            uniforms,
            primitive,
            texture,
            ui_object,
            deformations: Vec::new(),
            needs_upload: true,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn attributes(&self) -> &VertexAttributes {
        &self.attributes
    }

    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut Uniforms {
        &mut self.uniforms
    }

    /// The bounds computed at creation or at the last [`Self::recalculate_dimensions`].
    ///
    /// Deformations do not refresh these.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn recalculate_dimensions(&mut self) -> Dimensions {
        self.dimensions = Dimensions::from_positions(&self.attributes.position);
        self.dimensions
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn texture(&self) -> Option<&str> {
        self.texture.as_deref()
    }

    pub fn is_ui_object(&self) -> bool {
        self.ui_object
    }

    pub fn vertex(&self, n: usize) -> Option<Vector3> {
        self.attributes.vertex(n)
    }

    /// Queues the replacement of vertex `n` with `position`.
    pub fn deform_vertex(&mut self, n: usize, position: Vector3) -> &mut Self {
        self.deformations.push(Deformation::Vertex { index: n, position });
        self
    }

    /// Queues the replacement of the `axes` components of vertex `n` with those of `position`.
    pub fn deform_vertex_component(
        &mut self,
        n: usize,
        position: Vector3,
        axes: &[Axis],
    ) -> &mut Self {
        self.deformations.push(Deformation::Components {
            index: n,
            position,
            axes: axes.to_vec(),
        });
        self
    }

    pub fn pending_deformations(&self) -> &[Deformation] {
        &self.deformations
    }

    /// Applies and clears every queued deformation, returning how many were applied.
    ///
    /// Deformations naming a vertex that does not exist are dropped with a warning.
    pub(crate) fn drain_deformations(&mut self) -> usize {
        let mut applied = 0;
        for deformation in self.deformations.drain(..) {
            match deformation.apply(&mut self.attributes) {
                Ok(()) => applied += 1,
                Err(e) => tracing::warn!("Skipping deformation of {:?}: {}", self.name, e),
            }
        }
        if applied > 0 {
            tracing::debug!("Applied {} deformation(s) to {:?}", applied, self.name);
            self.needs_upload = true;
        }

        applied
    }
}
