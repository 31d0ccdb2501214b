// Copyright 2020 @TwoCookingMice

use super::constants::{Float, Vector3f, EPSILON, SHADOW_EPSILON};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3f {
    origin: Vector3f,
    dir: Vector3f,
    pub min_t: Float,
    pub max_t: Float
}

impl Ray3f {
    pub fn new(o: Vector3f, d: Vector3f,
               min_t: Option<Float>, max_t: Option<Float>) -> Self {
        Self { origin: o, dir: d.normalize(),
               min_t: min_t.unwrap_or(0.0),
               max_t: max_t.unwrap_or(std::f32::MAX)}
    }

    pub fn origin(&self) -> Vector3f {
        self.origin
    }

    pub fn dir(&self) -> Vector3f {
        self.dir
    }

    pub fn at(&self, t: Float) -> Vector3f {
        self.origin + self.dir * t
    }

    pub fn update(&mut self, t: Float) -> bool {
        if t < self.min_t || t > self.max_t {
            false
        } else {
            self.max_t = t;
            true
        }
    }

    pub fn test_segment(&self, t: Float) -> bool {
        t >= self.min_t && t <= self.max_t
    }

    /// Continuation ray leaving surface point `p` (geometric normal `n`)
    /// along `d`, with the origin pushed off the surface on the side of `d`.
    pub fn spawn(p: &Vector3f, n: &Vector3f, d: &Vector3f) -> Self {
        Self::new(offset_origin(p, n, d), *d, Some(0.0), None)
    }

    /// Shadow ray from surface point `p` toward `target`, stopping just short
    /// of it so the target surface does not occlude itself.
    pub fn spawn_to(p: &Vector3f, n: &Vector3f, target: &Vector3f) -> Self {
        let origin = offset_origin(p, n, &(target - p));
        let d = target - origin;
        let dist = d.norm();
        Self::new(origin, d, Some(0.0), Some(dist * (1.0 - SHADOW_EPSILON)))
    }
}

// Offset scales with the magnitude of the coordinates.
fn offset_origin(p: &Vector3f, n: &Vector3f, d: &Vector3f) -> Vector3f {
    let offset = EPSILON * (1.0 + p.amax());
    if n.dot(d) >= 0.0 {
        p + n * offset
    } else {
        p - n * offset
    }
}

/* Tests for Ray */

#[cfg(test)]
mod tests {
    use super::{Ray3f, Vector3f};

    #[test]
    fn test_ray3f() {
        let o = Vector3f::new(0.0, 0.0, 0.0);
        let d = Vector3f::new(1.0, 0.0, 1.0);
        let mut ray = Ray3f::new(o, d, None, None);
        assert_eq!(o, ray.origin());

        let v1 = ray.at(2.0);
        assert!((v1[0] - std::f32::consts::SQRT_2).abs() < 1e-5);
        assert!((v1[1] - 0.0).abs() < 1e-5);
        assert!((v1[2] - std::f32::consts::SQRT_2).abs() < 1e-5);

        let status1 = ray.update(100.0);
        let status2 = ray.update(105.0);
        assert_eq!(status1, true);
        assert_eq!(status2, false);
        assert!(ray.test_segment(50.0));
        assert!(!ray.test_segment(101.0));
    }

    #[test]
    fn test_spawned_rays_leave_the_surface() {
        let p = Vector3f::new(0.0, 0.0, 0.0);
        let n = Vector3f::new(0.0, 0.0, 1.0);

        let up = Ray3f::spawn(&p, &n, &Vector3f::new(0.0, 1.0, 1.0));
        assert!(up.origin().z > 0.0);
        let down = Ray3f::spawn(&p, &n, &Vector3f::new(0.0, 1.0, -1.0));
        assert!(down.origin().z < 0.0);

        let target = Vector3f::new(0.0, 0.0, 2.0);
        let shadow = Ray3f::spawn_to(&p, &n, &target);
        assert!(shadow.max_t < 2.0 && shadow.max_t > 1.99);
        assert!((shadow.dir() - n).norm() < 1e-6);
    }
}
