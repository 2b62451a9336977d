// SPDX-License-Identifier: MPL-2.0

//! The camera and the per-frame matrices derived from it.

use crate::{Matrix4, Vector3};

/// The depth range of the orthographic projection.
pub const ORTHOGRAPHIC_DEPTH: f32 = 1000.;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Projection {
    #[default]
    Perspective,
    /// A pixel-space projection over a `width` by `height` viewport.
    Orthographic { width: f32, height: f32 },
}

/// The view parameters, edited freely between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewSettings {
    pub projection: Projection,
    /// Vertical field of view, in radians.
    pub fov_y: f32,
    pub near: f32,
    /// May be [`f32::INFINITY`].
    pub far: f32,
    pub aspect_ratio: f32,
    pub up: Vector3,
    /// The location of the camera in world space.
    ///
    /// This is rotated by [`Self::arc`] on every frame.
    pub position: Vector3,
    /// The point the camera looks at.
    pub target: Vector3,
    /// Rotation about the camera's own axes, applied after aiming it at the target.
    pub angle: Vector3,
    /// Rotation of [`Self::position`] about the world axes, applied once per frame.
    ///
    /// A nonzero arc therefore orbits the camera at a constant angular velocity.
    pub arc: Vector3,
    /// Scale of the camera along each of its axes.
    pub zoom: Vector3,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            projection: Projection::Perspective,
            fov_y: 60f32.to_radians(),
            near: 1.,
            far: 2000.,
            aspect_ratio: 1.,
            up: Vector3::Y,
            position: Vector3::splat(50.),
            target: Vector3::ZERO,
            angle: Vector3::ZERO,
            arc: Vector3::ZERO,
            zoom: Vector3::ONE,
        }
    }
}

impl ViewSettings {
    pub fn projection_matrix(&self) -> Matrix4 {
        match self.projection {
            Projection::Perspective => {
                Matrix4::perspective(self.fov_y, self.aspect_ratio, self.near, self.far)
            }
            Projection::Orthographic { width, height } => {
                Matrix4::projection(width, height, ORTHOGRAPHIC_DEPTH)
            }
        }
    }

    /// Rotates [`Self::position`] by [`Self::arc`], about X, then Y, then Z.
    pub fn advance_arc(&mut self) {
        let [ax, ay, az] = self.arc.to_array();
        if (ax, ay, az) == (0., 0., 0.) {
            return;
        }

        for rotation in [
            Matrix4::x_rotation(ax),
            Matrix4::y_rotation(ay),
            Matrix4::z_rotation(az),
        ] {
            self.position = rotation.transform_point(self.position);
        }
    }

    /// The world matrix of the camera, without advancing the arc.
    pub fn camera_matrix(&self) -> Matrix4 {
        let [ax, ay, az] = self.angle.to_array();
        let [zx, zy, zz] = self.zoom.to_array();

        Matrix4::look_at(self.position, self.target, self.up)
            .x_rotate(ax)
            .y_rotate(ay)
            .z_rotate(az)
            .scale(zx, zy, zz)
    }
}

/// The matrices shared by every object in a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewMatrices {
    pub projection: Matrix4,
    pub camera: Matrix4,
    pub view: Matrix4,
    pub view_projection: Matrix4,
}

impl ViewMatrices {
    /// Advances the camera arc and derives this frame's matrices from `settings`.
    pub fn compute(settings: &mut ViewSettings) -> Self {
        let projection = settings.projection_matrix();
        settings.advance_arc();
        let camera = settings.camera_matrix();
        let view = camera.inverse();

        Self {
            projection,
            camera,
            view,
            view_projection: projection.multiply(&view),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;
    use crate::linear::approx_eq;

    fn assert_vector_eq(a: Vector3, b: Vector3) {
        for i in 0..3 {
            assert!(approx_eq(a[i], b[i]), "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn default_view_looks_from_fifty_fifty_fifty() {
        let mut settings = ViewSettings::default();
        let matrices = ViewMatrices::compute(&mut settings);

        assert_eq!(settings.position, Vector3::splat(50.));
        assert_vector_eq(matrices.view.transform_point(settings.position), Vector3::ZERO);
        assert_eq!(matrices.view_projection, matrices.projection.multiply(&matrices.view));
    }

    #[test]
    fn target_lies_on_the_negative_z_axis() {
        let mut settings = ViewSettings { zoom: Vector3::splat(2.), ..Default::default() };
        let matrices = ViewMatrices::compute(&mut settings);
        let distance = Vector3::splat(50.).length();

        assert_vector_eq(
            matrices.view.transform_point(Vector3::ZERO),
            Vector3::new(0., 0., -distance / 2.),
        );
    }

    #[test]
    fn arc_accumulates_across_frames() {
        let mut settings = ViewSettings {
            arc: Vector3::new(0., FRAC_PI_2, 0.),
            ..Default::default()
        };

        ViewMatrices::compute(&mut settings);
        assert_vector_eq(settings.position, Vector3::new(50., 50., -50.));

        ViewMatrices::compute(&mut settings);
        assert_vector_eq(settings.position, Vector3::new(-50., 50., -50.));
    }

    #[test]
    fn orthographic_uses_pixel_projection() {
        let settings = ViewSettings {
            projection: Projection::Orthographic { width: 800., height: 600. },
            ..Default::default()
        };

        assert_eq!(
            settings.projection_matrix(),
            Matrix4::projection(800., 600., ORTHOGRAPHIC_DEPTH),
        );
    }

    #[test]
    fn infinite_far_plane_passes_through() {
        let settings = ViewSettings { far: f32::INFINITY, ..Default::default() };
        let projection = settings.projection_matrix();

        assert_eq!(projection.get(2, 2), -1.);
        assert_eq!(projection.get(2, 3), -2.);
    }
}
