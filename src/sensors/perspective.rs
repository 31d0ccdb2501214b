// Copyright @yucwang 2026

use crate::core::sensor::Sensor;
use crate::math::constants::{Float, Matrix4f, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// Pinhole camera. Camera space looks down +z with +y up; the image plane
/// at z = 1 spans `[-extent.x, extent.x] x [-extent.y, extent.y]`.
pub struct PerspectiveCamera {
    to_world: Transform,
    extent: Vector2f,
    near_clip: Float,
    far_clip: Float,
    width: usize,
    height: usize,
}

impl PerspectiveCamera {
    pub fn new(origin: Vector3f,
               target: Vector3f,
               up: Vector3f,
               fov_y_radians: Float,
               width: usize,
               height: usize,
               near_clip: Float,
               far_clip: Float) -> Self {
        let aspect = if height > 0 { width as Float / height as Float } else { 1.0 };
        let half_height = (0.5 * fov_y_radians).tan();

        Self {
            to_world: look_at(&origin, &target, &up),
            extent: Vector2f::new(half_height * aspect, half_height),
            near_clip,
            far_clip,
            width,
            height,
        }
    }
}

// Columns are the camera's right, up and forward axes and its position.
fn look_at(origin: &Vector3f, target: &Vector3f, up: &Vector3f) -> Transform {
    let forward = (target - origin).normalize();
    let right = forward.cross(up).normalize();
    let up = right.cross(&forward);
    Transform::new(Matrix4f::new(right.x, up.x, forward.x, origin.x,
                                 right.y, up.y, forward.y, origin.y,
                                 right.z, up.z, forward.z, origin.z,
                                 0.0, 0.0, 0.0, 1.0))
}

impl Sensor for PerspectiveCamera {
    fn sample_ray(&self, u: &Vector2f) -> Ray3f {
        let on_plane = Vector3f::new((2.0 * u.x - 1.0) * self.extent.x,
                                     (1.0 - 2.0 * u.y) * self.extent.y,
                                     1.0);
        let d_local = on_plane.normalize();
        let d = self.to_world.apply_vector(d_local).normalize();

        // Clip distances are measured along the optical axis.
        let inv_z = 1.0 / d_local.z;
        let near_t = self.near_clip * inv_z;
        let far_t = self.far_clip * inv_z;
        let origin = self.to_world.apply_point(Vector3f::zeros()) + d * near_t;
        Ray3f::new(origin, d, Some(0.0), Some(far_t - near_t))
    }

    fn resolution(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn describe(&self) -> String {
        format!("PerspectiveCamera[{}x{}, position={:?}, extent={:?}, clip=[{}, {}]]",
                self.width, self.height, self.to_world.apply_point(Vector3f::zeros()),
                self.extent, self.near_clip, self.far_clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(width: usize, height: usize, near: Float, far: Float) -> PerspectiveCamera {
        PerspectiveCamera::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), Vector3f::new(0.0, 1.0, 0.0),
                               std::f32::consts::FRAC_PI_2, width, height, near, far)
    }

    #[test]
    fn test_center_ray_follows_the_view_axis() {
        let cam = camera(4, 4, 0.0, 1e4);
        let ray = cam.sample_ray(&Vector2f::new(0.5, 0.5));
        assert!((ray.dir() - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-6);
        assert!(ray.origin().norm() < 1e-6);
        assert_eq!(cam.resolution(), (4, 4));
    }

    #[test]
    fn test_top_left_corner_looks_up_left() {
        let cam = camera(8, 4, 0.01, 100.0);
        let ray = cam.sample_ray(&Vector2f::new(0.0, 0.0));
        assert!(ray.dir().x < 0.0);
        assert!(ray.dir().y > 0.0);
        assert!(ray.origin().norm() > 0.0);
    }

    #[test]
    fn test_aspect_ratio_and_clipping() {
        // 90 degrees vertically on a 2:1 film: the right edge sits at x = 2 on the plane.
        let cam = camera(8, 4, 1.0, 3.0);
        let edge = cam.sample_ray(&Vector2f::new(1.0, 0.5));
        let d = edge.dir();
        assert!((d.x / -d.z - 2.0).abs() < 1e-5);

        // Near plane at z = -1, far plane at z = -3 along the axis.
        let start = edge.origin();
        let end = edge.at(edge.max_t);
        assert!((start.z + 1.0).abs() < 1e-5);
        assert!((end.z + 3.0).abs() < 1e-4);
    }
}
