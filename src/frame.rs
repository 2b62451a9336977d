// SPDX-License-Identifier: MPL-2.0

//! Frames.
//!
//! Every frame passes through three phases, in order: local transforms, vertex data, and view
//! parameters are *mutated*; world matrices are *propagated* down the scene graph; and objects
//! are *rendered* with matrices derived from the fresh world matrices. A [`Frame`] is tagged
//! with its phase, so reading draw-time matrices before propagation, or mutating the scene
//! after it, does not compile.

use crate::{
    camera::ViewMatrices,
    object::Object,
    renderer::Backend,
    scene::ObjectMut,
    tree::Node,
    uniforms,
    NodeId,
    ObjectId,
    Result,
    Scene,
    SceneGraph,
    Uniforms,
    ViewSettings,
};

/// The phase in which the scene may be changed.
#[derive(Debug)]
pub struct Mutate;

/// The phase in which matrices are final and objects may be drawn.
#[derive(Debug)]
pub struct Render {
    view: ViewMatrices,
}

#[derive(Debug)]
pub struct Frame<'a, P> {
    scene: &'a mut Scene,
    delta_time: f32,
    phase: P,
}

impl<P> Frame<'_, P> {
    /// Seconds elapsed since the previous frame.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.scene.graph
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.scene.object(id)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.scene.objects()
    }
}

impl<'a> Frame<'a, Mutate> {
    pub(crate) fn new(scene: &'a mut Scene, delta_time: f32) -> Self {
        Self {
            scene,
            delta_time,
            phase: Mutate,
        }
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    pub fn view_mut(&mut self) -> &mut ViewSettings {
        &mut self.scene.view
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene.graph
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.scene.graph.node_mut(id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<ObjectMut<'_>> {
        self.scene.object_mut(id)
    }

    pub fn try_object_mut(&mut self, id: ObjectId) -> Result<ObjectMut<'_>> {
        self.scene.try_object_mut(id)
    }

    /// Ends the mutation phase.
    ///
    /// This advances the camera, applies queued vertex deformations, moves light nodes to their
    /// lights, refreshes every world matrix, and derives the uniforms of each object.
    pub fn propagate(self) -> Frame<'a, Render> {
        let Self { scene, delta_time, phase: Mutate } = self;

        let view = ViewMatrices::compute(&mut scene.view);
        for object in &mut scene.objects {
            object.drain_deformations();
        }
        scene.place_light_nodes();
        scene.graph.update_world_matrices();

        let light_position = scene.lights.first().map(|light| light.position);
        for object in &mut scene.objects {
            let world = scene
                .graph
                .world_matrix(object.node())
                .unwrap_or_default();
            if scene.validate_matrices && world.try_inverse().is_none() {
                tracing::warn!(
                    "World matrix of {:?} is not invertible; its normals will not be finite",
                    object.name(),
                );
            }

            let values = &mut object.uniforms;
            values.insert(uniforms::WORLD, world);
            values.insert(uniforms::WORLD_VIEW_PROJECTION, view.view_projection.multiply(&world));
            values.insert(uniforms::WORLD_INVERSE_TRANSPOSE, world.inverse().transpose());
            if let Some(position) = light_position {
                values.insert(uniforms::LIGHT_WORLD_POSITION, position);
            }
        }

        Frame {
            scene,
            delta_time,
            phase: Render { view },
        }
    }
}

impl Frame<'_, Render> {
    pub fn view_matrices(&self) -> &ViewMatrices {
        &self.phase.view
    }

    /// The uniforms `id` will be drawn with.
    pub fn object_uniforms(&self, id: ObjectId) -> Option<&Uniforms> {
        self.scene.object(id).map(Object::uniforms)
    }

    /// Draws every object, in creation order, through `backend`.
    ///
    /// Vertex data is uploaded first for objects that are new or were deformed this frame.
    pub fn render(self, backend: &mut impl Backend) {
        tracing::info!("Rendering {} object(s)...", self.scene.objects.len());
        backend.begin(self.scene.objects.len());

        for (i, object) in self.scene.objects.iter_mut().enumerate() {
            let id = ObjectId(i as u32);
            if object.needs_upload {
                tracing::debug!("Uploading vertices of {:?}", object.name());
                backend.upload_vertices(id, object);
                object.needs_upload = false;
            }

            tracing::trace!("Drawing {:?}", object.name());
            backend.draw(id, object, object.uniforms());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectSettings, Vector3, VertexAttributes};

    #[derive(Default)]
    struct Counter {
        uploads: Vec<ObjectId>,
        draws: Vec<ObjectId>,
    }

    impl Backend for Counter {
        fn upload_vertices(&mut self, id: ObjectId, _: &Object) {
            self.uploads.push(id);
        }

        fn draw(&mut self, id: ObjectId, _: &Object, _: &Uniforms) {
            self.draws.push(id);
        }
    }

    #[test]
    fn uploads_only_new_or_deformed_objects() {
        let mut scene = Scene::new();
        let attributes = VertexAttributes::from_positions(vec![0.; 9]);
        let a = scene.add_object(ObjectSettings::new("a", attributes.clone())).unwrap();
        let b = scene.add_object(ObjectSettings::new("b", attributes)).unwrap();

        let mut backend = Counter::default();
        scene.begin_frame(0.).propagate().render(&mut backend);
        assert_eq!(backend.uploads, vec![a, b]);

        let mut frame = scene.begin_frame(0.);
        frame.object_mut(b).unwrap().deform_vertex(1, Vector3::ONE);
        frame.propagate().render(&mut backend);

        assert_eq!(backend.uploads, vec![a, b, b]);
        assert_eq!(backend.draws, vec![a, b, a, b]);
        assert_eq!(scene.object(b).unwrap().vertex(1), Some(Vector3::ONE));
    }

    #[test]
    fn failed_deformations_do_not_trigger_uploads() {
        let mut scene = Scene::new();
        let id = scene
            .add_object(ObjectSettings::new("a", VertexAttributes::from_positions(vec![0.; 3])))
            .unwrap();
        let mut backend = Counter::default();
        scene.begin_frame(0.).propagate().render(&mut backend);

        let mut frame = scene.begin_frame(0.);
        frame
            .object_mut(id)
            .unwrap()
            .deform_vertex(5, Vector3::ONE)
            .deform_vertex(usize::MAX, Vector3::ONE);
        frame.propagate().render(&mut backend);

        assert_eq!(backend.uploads, vec![id]);
        assert_eq!(backend.draws, vec![id, id]);
    }

    #[test]
    fn singular_world_matrix_propagates_non_finite_normals() {
        let mut scene = Scene::new();
        scene.set_validate_matrices(true);
        let id = scene
            .add_object(ObjectSettings::default().scale(Vector3::ZERO))
            .unwrap();

        let frame = scene.begin_frame(0.).propagate();
        let values = frame.object_uniforms(id).unwrap();

        let normals = values.mat4(uniforms::WORLD_INVERSE_TRANSPOSE).unwrap();
        assert!(!normals.is_finite());
        assert!(values.mat4(uniforms::WORLD).unwrap().is_finite());
    }
}
