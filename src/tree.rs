// SPDX-License-Identifier: MPL-2.0

//! The scene graph.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and refer to each other through [`NodeId`]
//! handles. The graph is a tree rooted at a sentinel node named [`ROOT_NAME`]; every node other
//! than the root has at most one parent, and [`SceneGraph::set_parent`] refuses any edge that
//! would close a cycle.
//!
//! World matrices are *not* kept up to date automatically. They are valid only after the most
//! recent call to [`SceneGraph::update_world_matrices`], which must follow every local-matrix
//! mutation for the frame.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::{Error, Matrix4, Result, Vector3};

/// The name of the sentinel root node.
pub const ROOT_NAME: &str = "world";

/// The name of the node created under the root alongside it.
pub const WORLD_ORIGIN_NAME: &str = "worldOrigin";

/// A handle to a node within a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// The root node, present in every graph.
    pub const ROOT: Self = Self(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Something that provides a node's local matrix anew before each world-matrix refresh.
///
/// Orbital motion and other externally-driven transforms plug in here.
pub trait TransformSource {
    fn matrix(&self) -> Matrix4;
}

/// Shared sources, so that the application can keep a handle and edit it between frames.
impl<T: TransformSource> TransformSource for Rc<RefCell<T>> {
    fn matrix(&self) -> Matrix4 {
        self.borrow().matrix()
    }
}

/// A translation, rotation, and scale, composed as `T * Rx * Ry * Rz * S`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    pub translation: Vector3,
    /// Rotation about each axis, in radians.
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: Vector3::ZERO,
            rotation: Vector3::ZERO,
            scale: Vector3::ONE,
        }
    }
}

impl TransformSource for Trs {
    fn matrix(&self) -> Matrix4 {
        let [tx, ty, tz] = self.translation.to_array();
        let [rx, ry, rz] = self.rotation.to_array();
        let [sx, sy, sz] = self.scale.to_array();

        Matrix4::translation(tx, ty, tz)
            .x_rotate(rx)
            .y_rotate(ry)
            .z_rotate(rz)
            .scale(sx, sy, sz)
    }
}

pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// The transform of this node relative to its parent.
    local_matrix: Matrix4,
    /// The absolute transform of this node, as of the last world-matrix refresh.
    world_matrix: Matrix4,
    source: Option<Box<dyn TransformSource>>,
    ui_node: bool,
}

impl Node {
    fn new(name: String, source: Option<Box<dyn TransformSource>>) -> Self {
        Self {
            name,
            parent: None,
            children: Vec::new(),
            local_matrix: Matrix4::IDENTITY,
            world_matrix: Matrix4::IDENTITY,
            source,
            ui_node: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_matrix(&self) -> Matrix4 {
        self.local_matrix
    }

    pub fn set_local_matrix(&mut self, matrix: Matrix4) -> &mut Self {
        self.local_matrix = matrix;
        self
    }

    /// The world matrix as of the last refresh. Stale until the next traversal after any
    /// local-matrix change.
    pub fn world_matrix(&self) -> Matrix4 {
        self.world_matrix
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn set_source(&mut self, source: Option<Box<dyn TransformSource>>) -> &mut Self {
        self.source = source;
        self
    }

    pub fn is_ui_node(&self) -> bool {
        self.ui_node
    }

    pub fn set_ui_node(&mut self, ui_node: bool) -> &mut Self {
        self.ui_node = ui_node;
        self
    }

    /// The world-space position of this node's origin.
    pub fn location(&self) -> Vector3 {
        self.world_matrix.location()
    }

    /// Angles, in degrees, of [`Self::location`] within the YZ, XZ, and XY planes.
    pub fn orientation(&self) -> Vector3 {
        let [x, y, z] = self.location().to_array();

        Vector3::new(
            z.atan2(y).to_degrees(),
            z.atan2(x).to_degrees(),
            y.atan2(x).to_degrees(),
        )
    }

    // The mutators below all left-multiply: the new transform is applied after the existing
    // local matrix, in the parent's frame.

    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) -> &mut Self {
        self.premultiply(Matrix4::translation(tx, ty, tz))
    }

    pub fn x_rotate(&mut self, radians: f32) -> &mut Self {
        self.premultiply(Matrix4::x_rotation(radians))
    }

    pub fn y_rotate(&mut self, radians: f32) -> &mut Self {
        self.premultiply(Matrix4::y_rotation(radians))
    }

    pub fn z_rotate(&mut self, radians: f32) -> &mut Self {
        self.premultiply(Matrix4::z_rotation(radians))
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        self.premultiply(Matrix4::scaling(sx, sy, sz))
    }

    fn premultiply(&mut self, matrix: Matrix4) -> &mut Self {
        self.local_matrix = matrix.multiply(&self.local_matrix);
        self
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("local_matrix", &self.local_matrix)
            .field("world_matrix", &self.world_matrix)
            .field("has_source", &self.source.is_some())
            .field("ui_node", &self.ui_node)
            .finish()
    }
}

/// Parameters for [`SceneGraph::create_node`].
#[derive(Clone, Debug, Default)]
pub struct NodeSettings {
    pub name: String,
    /// Defaults to the root.
    pub parent: Option<NodeId>,
    pub translation: Option<Vector3>,
}

impl NodeSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn translation(mut self, translation: Vector3) -> Self {
        self.translation = Some(translation);
        self
    }
}

/// An arena of [`Node`]s forming a tree under [`NodeId::ROOT`].
#[derive(Debug)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    /// The first node to take each name.
    first_named: HashMap<String, NodeId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph holding the root and its [`WORLD_ORIGIN_NAME`] child.
    pub fn new() -> Self {
        let mut this = Self {
            nodes: vec![Node::new(ROOT_NAME.to_owned(), None)],
            first_named: HashMap::from([(ROOT_NAME.to_owned(), NodeId::ROOT)]),
        };
        this.add_node(WORLD_ORIGIN_NAME);

        this
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The root is never removed.
        false
    }

    /// Adds a node under the root.
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.insert(Node::new(name.into(), None))
    }

    /// Adds a node under the root whose local matrix is taken from `source` on every refresh.
    pub fn add_node_with_source(
        &mut self,
        name: impl Into<String>,
        source: Box<dyn TransformSource>,
    ) -> NodeId {
        self.insert(Node::new(name.into(), Some(source)))
    }

    /// Adds a node, parents it, and translates it, as described by `settings`.
    pub fn create_node(&mut self, settings: NodeSettings) -> Result<NodeId> {
        let parent = settings.parent.unwrap_or(NodeId::ROOT);
        self.check(parent)?;

        let id = self.add_node(settings.name);
        self.set_parent(id, parent)?;
        if let Some(t) = settings.translation {
            self.nodes[id.index()].translate(t.x(), t.y(), t.z());
        }

        Ok(id)
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if self.first_named.contains_key(&node.name) {
            tracing::warn!("Scene graph already holds a node named {:?}", node.name);
        } else {
            self.first_named.insert(node.name.clone(), id);
        }

        self.nodes.push(node);
        self.link(id, NodeId::ROOT);

        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// The first node, in insertion order, named `name`.
    ///
    /// Names are not required to be unique.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.first_named.get(name).copied()
    }

    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.iter()
            .filter(move |(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or_default()
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4> {
        self.node(id).map(Node::world_matrix)
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::UnknownNode(id))
        }
    }

    /// Whether `ancestor` lies on the path from `id` up to the root, `id` itself excluded.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }

        false
    }

    /// Moves `child` under `parent`, removing it from its previous parent's children.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        self.check(child)?;
        self.check(parent)?;
        if child == NodeId::ROOT {
            return Err(Error::RootReparent);
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(Error::CyclicParent { child, parent });
        }

        self.unlink(child);
        self.link(child, parent);
        tracing::debug!(
            "Parented {:?} to {:?}",
            self.nodes[child.index()].name,
            self.nodes[parent.index()].name,
        );

        Ok(())
    }

    /// Removes `child` from its parent. Detached nodes are skipped by world-matrix refreshes
    /// until they are parented again.
    pub fn detach(&mut self, child: NodeId) -> Result<()> {
        self.check(child)?;
        if child == NodeId::ROOT {
            return Err(Error::RootReparent);
        }
        self.unlink(child);

        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(old) = self.nodes[child.index()].parent.take() {
            self.nodes[old.index()].children.retain(|&c| c != child);
        }
    }

    fn link(&mut self, child: NodeId, parent: NodeId) {
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Recomputes every world matrix, top-down from the root.
    pub fn update_world_matrices(&mut self) {
        self.refresh(NodeId::ROOT, None);
    }

    /// Recomputes the world matrices of the subtree at `id`.
    ///
    /// With a `parent_world` matrix, the world matrix of `id` becomes `parent_world * local`;
    /// without one, it is a copy of the local matrix.
    pub fn update_world_matrix(&mut self, id: NodeId, parent_world: Option<Matrix4>) -> Result<()> {
        self.check(id)?;
        self.refresh(id, parent_world);

        Ok(())
    }

    fn refresh(&mut self, id: NodeId, parent_world: Option<Matrix4>) {
        // Pre-order, depth first. Children are pushed in reverse so that they pop in order.
        let mut stack = vec![(id, parent_world)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.index()];
            if let Some(source) = &node.source {
                node.local_matrix = source.matrix();
            }
            node.world_matrix = match parent_world {
                Some(parent_world) => parent_world.multiply(&node.local_matrix),
                None => node.local_matrix,
            };

            let world = node.world_matrix;
            stack.extend(node.children.iter().rev().map(|&child| (child, Some(world))));
        }
    }

    /// A printable outline of the tree under the root.
    pub fn print_tree(&self) -> TreeDump<'_> {
        TreeDump { graph: self }
    }

    pub fn log_tree(&self) {
        tracing::debug!("Scene graph:\n{}", self.print_tree());
    }
}

/// An indented outline of a [`SceneGraph`], produced by [`SceneGraph::print_tree`].
///
/// Siblings are listed in ascending order of their own child counts. Nodes flagged as UI nodes
/// carry a `[ui]` suffix.
pub struct TreeDump<'a> {
    graph: &'a SceneGraph,
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = &self.graph.nodes;
        let mut stack = vec![(NodeId::ROOT, 0)];
        while let Some((id, depth)) = stack.pop() {
            let node = &nodes[id.index()];
            write!(f, "{:indent$}{}", "", node.name, indent = depth * 2)?;
            if node.ui_node {
                write!(f, " [ui]")?;
            }
            writeln!(f)?;

            let mut children = node.children.clone();
            children.sort_by_key(|c| nodes[c.index()].children.len());
            stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        }

        Ok(())
    }
}
