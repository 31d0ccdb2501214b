// Copyright @yucwang 2026

use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::interaction::{PositionSample, ShapeIntersection};
use crate::core::shape::Shape;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::transform::Transform;

/// The square `[-1, 1]^2` in the local `z = 0` plane, placed by `to_world`.
/// The front face is along `dp_du x dp_dv`.
pub struct Rectangle {
    id: String,
    to_world: Transform,
    normal: Vector3f,
    area: Float,
    inv_area: Float,
}

impl Rectangle {
    pub fn new(to_world: Transform) -> Self {
        let dp_du = to_world.apply_vector(Vector3f::new(2.0, 0.0, 0.0));
        let dp_dv = to_world.apply_vector(Vector3f::new(0.0, 2.0, 0.0));
        let area = dp_du.cross(&dp_dv).norm();
        let inv_area = if area > 0.0 { 1.0 / area } else { 0.0 };
        let mut normal = dp_du.cross(&dp_dv);
        if normal.norm() > 0.0 {
            normal = normal.normalize();
        } else {
            normal = to_world.apply_normal(Vector3f::new(0.0, 0.0, 1.0));
            if normal.norm() > 0.0 {
                normal = normal.normalize();
            }
        }

        Self { id: generate_node_id("Rectangle"), to_world, normal, area, inv_area }
    }

    pub fn normal(&self) -> Vector3f {
        self.normal
    }

    // The local ray keeps the world parameterization, so `t` carries over.
    fn intersect_local(&self, ray: &Ray3f) -> Option<(Float, Vector2f)> {
        let (origin, dir) = self.to_world.inv_apply_ray_unnormalized(ray);
        if dir.z == 0.0 {
            return None;
        }

        let t = -origin.z / dir.z;
        if !ray.test_segment(t) {
            return None;
        }
        let p_local = origin + dir * t;
        if p_local.x.abs() > 1.0 || p_local.y.abs() > 1.0 {
            return None;
        }

        let uv = Vector2f::new(0.5 * (p_local.x + 1.0), 0.5 * (p_local.y + 1.0));
        Some((t, uv))
    }
}

impl ComputationNode for Rectangle {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Rectangle[id={}, area={}, normal={:?}]", self.id, self.area, self.normal)
    }
}

impl Shape for Rectangle {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeIntersection> {
        let (t, uv) = self.intersect_local(ray)?;
        Some(ShapeIntersection { t, p: ray.at(t), n: self.normal, uv })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_local(ray).is_some()
    }

    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let p_local = Vector3f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0, 0.0);
        PositionSample {
            p: self.to_world.apply_point(p_local),
            n: self.normal,
            uv: *u,
            pdf: self.inv_area,
        }
    }

    fn pdf_position(&self, _p: &Vector3f) -> Float {
        self.inv_area
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}
