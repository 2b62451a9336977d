// SPDX-License-Identifier: MPL-2.0

use std::f32::consts::FRAC_PI_2;

use arbor_engine::{
    uniforms,
    Backend,
    Matrix4,
    NodeSettings,
    Object,
    ObjectId,
    ObjectSettings,
    Scene,
    Uniforms,
    Vector3,
    VertexAttributes,
};

fn assert_matrix_eq(a: Matrix4, b: Matrix4) {
    for i in 0..16 {
        assert!((a[i] - b[i]).abs() < 1e-3, "entry {}: {}\n!=\n{}", i, a, b);
    }
}

#[derive(Default)]
struct Recorder {
    frames: usize,
    uploads: Vec<(ObjectId, usize)>,
    draws: Vec<(ObjectId, String, Uniforms)>,
}

impl Backend for Recorder {
    fn begin(&mut self, _: usize) {
        self.frames += 1;
    }

    fn upload_vertices(&mut self, id: ObjectId, object: &Object) {
        self.uploads.push((id, object.attributes().vertex_count()));
    }

    fn draw(&mut self, id: ObjectId, object: &Object, uniforms: &Uniforms) {
        self.draws.push((id, object.name().to_owned(), uniforms.clone()));
    }
}

fn triangle() -> VertexAttributes {
    VertexAttributes::from_positions(vec![0., 0., 0., 1., 0., 0., 0., 1., 0.])
}

#[test]
fn moon_orbits_at_one_hundred_thirty() {
    let mut scene = Scene::new();
    let graph = scene.graph_mut();
    let earth_orbit = graph
        .create_node(NodeSettings::new("earthOrbit").translation(Vector3::new(100., 0., 0.)))
        .unwrap();
    graph
        .create_node(
            NodeSettings::new("moonOrbit")
                .parent(earth_orbit)
                .translation(Vector3::new(30., 0., 0.)),
        )
        .unwrap();

    graph.update_world_matrices();

    let moon_orbit = graph.find("moonOrbit").unwrap();
    assert_eq!(
        graph.world_matrix(moon_orbit).unwrap().transform_point(Vector3::ZERO),
        Vector3::new(130., 0., 0.),
    );
}

#[test]
fn orbiting_parent_carries_its_children() {
    let mut scene = Scene::new();
    let orbit = scene.graph_mut().add_node("earthOrbit");
    let earth = scene
        .add_object(
            ObjectSettings::new("earth", triangle())
                .parent(orbit)
                .translation(Vector3::new(100., 0., 0.)),
        )
        .unwrap();

    let mut frame = scene.begin_frame(1.);
    let dt = frame.delta_time();
    frame.node_mut(orbit).unwrap().y_rotate(FRAC_PI_2 * dt);
    let frame = frame.propagate();

    let world = frame.object_uniforms(earth).unwrap().mat4(uniforms::WORLD).unwrap();
    let location = world.location();
    assert!(location.x().abs() < 1e-3);
    assert!((location.z() + 100.).abs() < 1e-3);
}

#[test]
fn uniforms_follow_the_matrix_pipeline() {
    let mut scene = Scene::new();
    scene.add_light(Vector3::new(0., 200., 0.));
    let id = scene
        .add_object(
            ObjectSettings::new("box", triangle())
                .translation(Vector3::new(10., 0., 0.))
                .scale(Vector3::new(1., 2., 3.)),
        )
        .unwrap();

    let mut recorder = Recorder::default();
    let frame = scene.begin_frame(0.016).propagate();
    let view_projection = frame.view_matrices().view_projection;
    frame.render(&mut recorder);

    let (drawn, name, drawn_uniforms) = &recorder.draws[0];
    assert_eq!((*drawn, name.as_str()), (id, "box"));

    let world = Matrix4::translation(10., 0., 0.).multiply(&Matrix4::scaling(1., 2., 3.));
    assert_matrix_eq(drawn_uniforms.mat4(uniforms::WORLD).unwrap(), world);
    assert_matrix_eq(
        drawn_uniforms.mat4(uniforms::WORLD_VIEW_PROJECTION).unwrap(),
        view_projection.multiply(&world),
    );
    assert_matrix_eq(
        drawn_uniforms.mat4(uniforms::WORLD_INVERSE_TRANSPOSE).unwrap(),
        world.inverse().transpose(),
    );
    assert_eq!(
        drawn_uniforms.get(uniforms::LIGHT_WORLD_POSITION).and_then(|v| v.as_vec3()),
        Some(Vector3::new(0., 200., 0.)),
    );
    assert_eq!(recorder.uploads, vec![(id, 3)]);
}

#[test]
fn custom_uniforms_survive_every_frame() {
    let mut scene = Scene::new();
    let custom: Uniforms = [(uniforms::COLOR, [1., 0.5, 0.5, 1.])].into_iter().collect();
    scene
        .add_object(ObjectSettings::new("tinted", triangle()).uniforms(custom))
        .unwrap();

    let mut recorder = Recorder::default();
    for _ in 0..3 {
        scene.begin_frame(0.016).propagate().render(&mut recorder);
    }

    assert_eq!(recorder.frames, 3);
    assert_eq!(recorder.uploads.len(), 1);
    assert!(recorder.draws.iter().all(|(_, _, u)| u.contains(uniforms::COLOR)));
}

#[test]
fn camera_arc_moves_the_view_every_frame() {
    let mut scene = Scene::new();
    scene.view_mut().arc = Vector3::new(0., 0.1, 0.);

    let first = scene.begin_frame(0.).propagate().view_matrices().view;
    let second = scene.begin_frame(0.).propagate().view_matrices().view;

    assert_ne!(first, second);
    let eye = scene.view().position;
    assert!(second.transform_point(eye).length() < 1e-3);
}

#[test]
fn deformed_vertices_are_reuploaded_once() {
    let mut scene = Scene::new();
    let id = scene.add_object(ObjectSettings::new("sheet", triangle())).unwrap();
    let mut recorder = Recorder::default();
    scene.begin_frame(0.).propagate().render(&mut recorder);

    let mut frame = scene.begin_frame(0.);
    frame
        .object_mut(id)
        .unwrap()
        .deform_vertex(2, Vector3::new(0., 5., 0.));
    frame.propagate().render(&mut recorder);
    scene.begin_frame(0.).propagate().render(&mut recorder);

    assert_eq!(recorder.uploads.len(), 2);
    assert_eq!(scene.object(id).unwrap().vertex(2), Some(Vector3::new(0., 5., 0.)));
    assert_eq!(scene.object(id).unwrap().dimensions().y_max, 1.);
}

#[test]
fn print_tree_lists_objects_under_their_parents() {
    let mut scene = Scene::new();
    let sun = scene.add_object(ObjectSettings::new("sun", triangle())).unwrap();
    let sun_node = scene.object(sun).unwrap().node();
    scene
        .add_object(ObjectSettings::new("earth", triangle()).parent(sun_node))
        .unwrap();

    let dump = scene.graph().print_tree().to_string();

    assert_eq!(dump, "world\n  worldOrigin\n  sun\n    earth\n");
}
