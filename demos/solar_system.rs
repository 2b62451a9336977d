// SPDX-License-Identifier: MPL-2.0

//! A sun, an earth, and a moon, driven headless for a few frames.

use std::{cell::RefCell, f32::consts::TAU, rc::Rc};

use arbor_engine::{
    uniforms,
    Backend,
    Matrix4,
    NodeSettings,
    Object,
    ObjectId,
    ObjectSettings,
    Scene,
    TransformSource,
    Uniforms,
    Vector3,
    VertexAttributes,
};

/// A circular orbit about the parent's Y axis.
struct Orbit {
    radius: f32,
    /// Radians per second.
    speed: f32,
    angle: f32,
}

impl TransformSource for Orbit {
    fn matrix(&self) -> Matrix4 {
        Matrix4::y_rotation(self.angle).translate(self.radius, 0., 0.)
    }
}

/// Logs what it is asked to draw.
struct LogBackend;

impl Backend for LogBackend {
    fn upload_vertices(&mut self, _: ObjectId, object: &Object) {
        tracing::info!(
            "upload {:?}: {} vertices",
            object.name(),
            object.attributes().vertex_count(),
        );
    }

    fn draw(&mut self, _: ObjectId, object: &Object, values: &Uniforms) {
        let location = values
            .mat4(uniforms::WORLD)
            .unwrap_or_default()
            .location();
        tracing::info!("draw {:?} at {:?}", object.name(), location.to_array());
    }
}

fn octahedron() -> VertexAttributes {
    let p = [
        [1., 0., 0.], [-1., 0., 0.],
        [0., 1., 0.], [0., -1., 0.],
        [0., 0., 1.], [0., 0., -1.],
    ];
    let faces: [[u32; 3]; 8] = [
        [0, 2, 4], [2, 1, 4], [1, 3, 4], [3, 0, 4],
        [2, 0, 5], [1, 2, 5], [3, 1, 5], [0, 3, 5],
    ];

    VertexAttributes {
        position: p.iter().flatten().copied().collect(),
        normal: p.iter().flatten().copied().collect(),
        indices: Some(faces.iter().flatten().copied().collect()),
        ..Default::default()
    }
}

fn main() -> arbor_engine::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut scene = Scene::new();
    let light = scene.add_light(Vector3::new(0., 150., 0.));

    let earth_orbit = Rc::new(RefCell::new(Orbit { radius: 100., speed: TAU / 8., angle: 0. }));
    let moon_orbit = Rc::new(RefCell::new(Orbit { radius: 30., speed: TAU, angle: 0. }));

    let graph = scene.graph_mut();
    let earth_orbit_node =
        graph.add_node_with_source("earthOrbit", Box::new(Rc::clone(&earth_orbit)));
    let moon_orbit_node =
        graph.add_node_with_source("moonOrbit", Box::new(Rc::clone(&moon_orbit)));
    graph.set_parent(moon_orbit_node, earth_orbit_node)?;
    let sun_node = graph.create_node(NodeSettings::new("sunPivot"))?;

    scene.add_object(ObjectSettings::new("sun", octahedron()).parent(sun_node).uniform_scale(10.))?;
    scene.add_object(ObjectSettings::new("earth", octahedron()).parent(earth_orbit_node).uniform_scale(4.))?;
    let moon = scene.add_object(
        ObjectSettings::new("moon", octahedron())
            .parent(moon_orbit_node)
            .uniform_scale(1.5),
    )?;
    let light_node = scene.graph_mut().add_node("pointLightSource");
    scene.set_light_node(light, light_node)?;
    scene.add_object(ObjectSettings::new("lightMarker", octahedron()).parent(light_node))?;
    scene.graph().log_tree();
    println!("{}", scene.graph().print_tree());

    let delta_time = 1. / 60.;
    let mut backend = LogBackend;
    for frame_number in 0..5 {
        for orbit in [&earth_orbit, &moon_orbit] {
            let mut orbit = orbit.borrow_mut();
            orbit.angle += orbit.speed * delta_time;
        }

        let mut frame = scene.begin_frame(delta_time);
        if frame_number == 3 {
            // Pull the moon's north pole out.
            frame
                .try_object_mut(moon)?
                .deform_vertex_component(2, Vector3::new(0., 2., 0.), &[arbor_engine::Axis::Y]);
        }
        frame.propagate().render(&mut backend);
    }

    let mut moon = scene.try_object_mut(moon)?;
    println!("moon ends at {:?}", moon.location().to_array());
    println!("moon dimensions: {:?}", moon.recalculate_dimensions());

    Ok(())
}
