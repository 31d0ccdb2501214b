// Copyright @yucwang 2026

use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::interaction::{PositionSample, ShapeIntersection};
use crate::core::shape::Shape;
use crate::math::constants::{Float, INV_PI, INV_TWO_PI, PI, Vector2f, Vector3f};
use crate::math::ray::Ray3f;
use crate::math::warp::sample_uniform_sphere;

pub struct Sphere {
    id: String,
    center: Vector3f,
    radius: Float,
    area: Float,
}

impl Sphere {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        let radius = radius.abs();
        Self { id: generate_node_id("Sphere"), center, radius, area: 4.0 * PI * radius * radius }
    }

    pub fn center(&self) -> Vector3f {
        self.center
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    // Nearest root inside the ray segment.
    fn intersect_t(&self, ray: &Ray3f) -> Option<Float> {
        let oc = ray.origin() - self.center;
        let b = oc.dot(&ray.dir());
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if ray.test_segment(near) {
            Some(near)
        } else if ray.test_segment(far) {
            Some(far)
        } else {
            None
        }
    }

    fn uv_of(n: &Vector3f) -> Vector2f {
        let mut phi = n.y.atan2(n.x);
        if phi < 0.0 {
            phi += 2.0 * PI;
        }
        let theta = n.z.max(-1.0).min(1.0).acos();
        Vector2f::new(phi * INV_TWO_PI, theta * INV_PI)
    }
}

impl ComputationNode for Sphere {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("Sphere[id={}, center={:?}, radius={}]", self.id, self.center, self.radius)
    }
}

impl Shape for Sphere {
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeIntersection> {
        let t = self.intersect_t(ray)?;
        let p = ray.at(t);
        let n = (p - self.center).normalize();
        Some(ShapeIntersection { t, p, n, uv: Sphere::uv_of(&n) })
    }

    fn ray_intersection_t(&self, ray: &Ray3f) -> bool {
        self.intersect_t(ray).is_some()
    }

    fn sample_position(&self, u: &Vector2f) -> PositionSample {
        let n = sample_uniform_sphere(u);
        PositionSample {
            p: self.center + n * self.radius,
            n,
            uv: Sphere::uv_of(&n),
            pdf: self.pdf_position(&n),
        }
    }

    fn pdf_position(&self, _p: &Vector3f) -> Float {
        if self.area > 0.0 { 1.0 / self.area } else { 0.0 }
    }

    fn surface_area(&self) -> Float {
        self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_and_inside_hits() {
        let sphere = Sphere::new(Vector3f::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = sphere.ray_intersection(&ray);
        assert!(hit.is_some());
        if let Some(hit) = hit {
            assert!((hit.t - 4.0).abs() < 1e-5);
            assert!((hit.n - Vector3f::new(0.0, 0.0, -1.0)).norm() < 1e-5);
        }

        let inside = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(1.0, 0.0, 0.0), None, None);
        let hit = sphere.ray_intersection(&inside);
        assert!(hit.map(|h| (h.t - 1.0).abs() < 1e-5).unwrap_or(false));

        let away = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, -1.0), None, None);
        assert!(!sphere.ray_intersection_t(&away));
    }

    #[test]
    fn test_samples_lie_on_surface() {
        let sphere = Sphere::new(Vector3f::new(1.0, 2.0, 3.0), 2.0);
        for i in 0..8 {
            for j in 0..8 {
                let u = Vector2f::new((i as Float + 0.5) / 8.0, (j as Float + 0.5) / 8.0);
                let s = sphere.sample_position(&u);
                assert!(((s.p - sphere.center()).norm() - 2.0).abs() < 1e-4);
                assert!((s.pdf * sphere.surface_area() - 1.0).abs() < 1e-5);
            }
        }
    }
}
