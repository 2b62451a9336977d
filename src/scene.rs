// SPDX-License-Identifier: MPL-2.0

use std::ops::{Deref, DerefMut};

use crate::{
    frame::{Frame, Mutate},
    object::{Object, Transform},
    tree::Node,
    Error,
    Matrix4,
    NodeId,
    ObjectId,
    ObjectSettings,
    Result,
    SceneGraph,
    Vector3,
    ViewSettings,
};

/// A scene graph, the objects hanging off it, the lights, and a camera that observes them.
///
/// A scene is rendered one [`Frame`] at a time; see [`Scene::begin_frame`].
#[derive(Debug, Default)]
pub struct Scene {
    pub(crate) graph: SceneGraph,
    pub(crate) objects: Vec<Object>,
    pub(crate) view: ViewSettings,
    pub(crate) lights: Vec<Light>,
    pub(crate) validate_matrices: bool,
}

/// A handle to a light within a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightId(u32);

/// A point light.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub name: String,
    /// The location of this light in world space.
    pub position: Vector3,
    node: Option<NodeId>,
}

impl Light {
    /// The node placed at [`Self::position`] on every frame, if any.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: ViewSettings) -> Self {
        Self {
            view,
            ..Default::default()
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewSettings {
        &mut self.view
    }

    /// Creates an object, along with its node, and applies its transform.
    pub fn add_object(&mut self, settings: ObjectSettings) -> Result<ObjectId> {
        let id = ObjectId(self.objects.len() as u32);
        let default_name = format!("Object #{}", id.0 + 1);
        self.objects.push(Object::new(default_name, settings, &mut self.graph)?);

        Ok(id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id.index())
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<ObjectMut<'_>> {
        let object = self.objects.get_mut(id.index())?;

        Some(ObjectMut::new(object, &mut self.graph))
    }

    /// Like [`Self::object_mut`], but failing with [`Error::UnknownObject`].
    pub fn try_object_mut(&mut self, id: ObjectId) -> Result<ObjectMut<'_>> {
        self.object_mut(id).ok_or(Error::UnknownObject(id))
    }

    /// The first object, in creation order, named `name`.
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects().find(|(_, o)| o.name() == name).map(|(id, _)| id)
    }

    /// Every object, in creation order, which is also draw order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjectId(i as u32), object))
    }

    /// Adds a point light named `light<n>`.
    ///
    /// The first light added feeds the light-position uniform of every object.
    pub fn add_light(&mut self, position: Vector3) -> LightId {
        let id = LightId(self.lights.len() as u32);
        self.lights.push(Light {
            name: format!("light{}", id.0),
            position,
            node: None,
        });

        id
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0 as usize)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0 as usize)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Makes `node` follow light `id`: on every frame, before world matrices are refreshed, the
    /// local matrix of `node` becomes a translation to the light's position.
    ///
    /// The node should hang off the root, so that its world position is the light's. Objects
    /// parented to it, such as a marker mesh, move with the light.
    pub fn set_light_node(&mut self, id: LightId, node: NodeId) -> Result<()> {
        if self.graph.node(node).is_none() {
            return Err(Error::UnknownNode(node));
        }
        let light = self.lights.get_mut(id.0 as usize).ok_or(Error::UnknownLight(id))?;
        light.node = Some(node);

        Ok(())
    }

    pub(crate) fn place_light_nodes(&mut self) {
        for light in &self.lights {
            let Some(node) = light.node.and_then(|id| self.graph.node_mut(id)) else {
                continue;
            };
            let p = light.position;
            node.set_local_matrix(Matrix4::translation(p.x(), p.y(), p.z()));
        }
    }

    /// Enables a check, on every frame, that each object's world matrix is invertible.
    ///
    /// Failures are logged; the object is still drawn with whatever the inversion produced.
    pub fn set_validate_matrices(&mut self, validate: bool) {
        self.validate_matrices = validate;
    }

    pub fn validates_matrices(&self) -> bool {
        self.validate_matrices
    }

    /// Opens the mutation phase of a frame.
    pub fn begin_frame(&mut self, delta_time: f32) -> Frame<'_, Mutate> {
        Frame::new(self, delta_time)
    }
}

/// Mutable access to an object together with its node.
///
/// Dereferences to the [`Object`] itself.
pub struct ObjectMut<'a> {
    object: &'a mut Object,
    graph: &'a mut SceneGraph,
}

impl<'a> ObjectMut<'a> {
    pub(crate) fn new(object: &'a mut Object, graph: &'a mut SceneGraph) -> Self {
        Self { object, graph }
    }
}

impl ObjectMut<'_> {
    fn node_mut(&mut self) -> Option<&mut Node> {
        self.graph.node_mut(self.object.node())
    }

    fn world_matrix(&self) -> Matrix4 {
        self.graph.world_matrix(self.object.node()).unwrap_or_default()
    }

    pub fn translate(&mut self, tx: f32, ty: f32, tz: f32) -> &mut Self {
        if let Some(node) = self.node_mut() {
            node.translate(tx, ty, tz);
        }
        self
    }

    pub fn x_rotate(&mut self, radians: f32) -> &mut Self {
        if let Some(node) = self.node_mut() {
            node.x_rotate(radians);
        }
        self
    }

    pub fn y_rotate(&mut self, radians: f32) -> &mut Self {
        if let Some(node) = self.node_mut() {
            node.y_rotate(radians);
        }
        self
    }

    pub fn z_rotate(&mut self, radians: f32) -> &mut Self {
        if let Some(node) = self.node_mut() {
            node.z_rotate(radians);
        }
        self
    }

    pub fn scale(&mut self, sx: f32, sy: f32, sz: f32) -> &mut Self {
        if let Some(node) = self.node_mut() {
            node.scale(sx, sy, sz);
        }
        self
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.object.transform
    }

    /// Rebuilds the node's local matrix from the object's transform record.
    pub fn reapply_transform(&mut self) -> &mut Self {
        let transform = self.object.transform;
        if let Some(node) = self.node_mut() {
            node.set_local_matrix(Matrix4::IDENTITY);
            transform.apply_to(node);
        }
        self
    }

    /// Moves the object's node under `parent`.
    pub fn set_parent(&mut self, parent: NodeId) -> Result<&mut Self> {
        self.graph.set_parent(self.object.node(), parent)?;

        Ok(self)
    }

    /// The world-space position of the object, as of the last world-matrix refresh.
    pub fn location(&self) -> Vector3 {
        self.world_matrix().location()
    }

    /// The elevation, in degrees, of the object's local X axis in world space.
    pub fn orientation(&self) -> f32 {
        self.world_matrix()[2].clamp(-1., 1.).asin().to_degrees()
    }
}

impl Deref for ObjectMut<'_> {
    type Target = Object;

    fn deref(&self) -> &Self::Target {
        self.object
    }
}

impl DerefMut for ObjectMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.object
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::{linear::approx_eq, VertexAttributes};

    #[test]
    fn objects_get_numbered_default_names() {
        let mut scene = Scene::new();
        let a = scene.add_object(ObjectSettings::default()).unwrap();
        let b = scene.add_object(ObjectSettings::new("named", VertexAttributes::default())).unwrap();

        assert_eq!(scene.object(a).unwrap().name(), "Object #1");
        assert_eq!(scene.find_object("named"), Some(b));
        assert!(scene.graph().find("Object #1").is_some());
    }

    #[test]
    fn unknown_parent_creates_nothing() {
        let mut scene = Scene::new();
        let stray = {
            let mut other = SceneGraph::new();
            other.add_node("a");
            other.add_node("b")
        };
        let nodes = scene.graph().len();

        let result = scene.add_object(ObjectSettings::default().parent(stray));

        assert!(matches!(result, Err(Error::UnknownNode(_))));
        assert_eq!(scene.graph().len(), nodes);
        assert_eq!(scene.objects().count(), 0);
    }

    #[test]
    fn transform_record_is_applied_only_on_request() {
        let mut scene = Scene::new();
        let id = scene
            .add_object(ObjectSettings::default().translation(Vector3::new(1., 0., 0.)))
            .unwrap();

        let mut object = scene.object_mut(id).unwrap();
        object.transform_mut().translation = Vector3::new(5., 0., 0.);
        scene.graph_mut().update_world_matrices();
        assert_eq!(scene.object_mut(id).unwrap().location(), Vector3::new(1., 0., 0.));

        scene.object_mut(id).unwrap().reapply_transform();
        scene.graph_mut().update_world_matrices();
        assert_eq!(scene.object_mut(id).unwrap().location(), Vector3::new(5., 0., 0.));
    }

    #[test]
    fn orientation_reads_world_x_axis_elevation() {
        let mut scene = Scene::new();
        let id = scene.add_object(ObjectSettings::default()).unwrap();
        scene.object_mut(id).unwrap().y_rotate(-FRAC_PI_2);
        scene.graph_mut().update_world_matrices();

        assert!(approx_eq(scene.object_mut(id).unwrap().orientation(), 90.));
    }

    #[test]
    fn lights_are_named_in_order() {
        let mut scene = Scene::new();
        scene.add_light(Vector3::ZERO);
        let second = scene.add_light(Vector3::new(0., 10., 0.));

        assert_eq!(scene.light(second).unwrap().name, "light1");
        scene.light_mut(second).unwrap().position = Vector3::ONE;
        assert_eq!(scene.lights()[1].position, Vector3::ONE);
    }

    #[test]
    fn light_nodes_follow_their_light() {
        let mut scene = Scene::new();
        let light = scene.add_light(Vector3::new(0., 200., 0.));
        let node = scene.graph_mut().add_node("pointLightSource");
        let marker = scene
            .add_object(ObjectSettings::new("marker", VertexAttributes::default()).parent(node))
            .unwrap();
        scene.set_light_node(light, node).unwrap();

        scene.begin_frame(0.).propagate();
        assert_eq!(scene.object_mut(marker).unwrap().location(), Vector3::new(0., 200., 0.));

        scene.light_mut(light).unwrap().position = Vector3::new(-50., 10., 0.);
        scene.begin_frame(0.).propagate();
        assert_eq!(scene.object_mut(marker).unwrap().location(), Vector3::new(-50., 10., 0.));
        assert_eq!(scene.light(light).unwrap().node(), Some(node));
    }

    #[test]
    fn light_nodes_must_exist() {
        let mut scene = Scene::new();
        let light = scene.add_light(Vector3::ZERO);
        let stray = {
            let mut other = SceneGraph::new();
            other.add_node("a");
            other.add_node("b")
        };

        assert!(matches!(scene.set_light_node(light, stray), Err(Error::UnknownNode(_))));
        assert!(matches!(
            scene.set_light_node(LightId(3), NodeId::ROOT),
            Err(Error::UnknownLight(LightId(3))),
        ));
        assert_eq!(scene.light(light).unwrap().node(), None);
    }
}
