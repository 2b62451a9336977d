// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;

use crate::{LightId, NodeId, ObjectId};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no node with id {0:?} exists in this scene graph")]
    UnknownNode(NodeId),
    #[error("no object with id {0:?} exists in this scene")]
    UnknownObject(ObjectId),
    #[error("no light with id {0:?} exists in this scene")]
    UnknownLight(LightId),
    #[error("cannot parent node {child:?} to {parent:?}: it would create a cycle")]
    CyclicParent { child: NodeId, parent: NodeId },
    #[error("the root node cannot be given a parent")]
    RootReparent,
    #[error("vertex {index} is out of range; the object has {count} vertices")]
    VertexOutOfRange { index: usize, count: usize },
    #[error("failed to load OBJ geometry")]
    ObjLoad(#[from] tobj::LoadError),
    #[error("{} contains no geometry", .0.display())]
    EmptyGeometry(PathBuf),
}
