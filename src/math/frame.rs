// Copyright @yucwang 2023

use crate::math::constants::Vector3f;

/// Orthonormal shading frame. Local directions have `z` along the normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    s: Vector3f,
    t: Vector3f,
    n: Vector3f
}

impl Default for Frame {
    fn default() -> Self {
        Frame {
            s: Vector3f::new(1.0, 0.0, 0.0),
            t: Vector3f::new(0.0, 1.0, 0.0),
            n: Vector3f::new(0.0, 0.0, 1.0)
        }
    }
}

impl Frame {
    pub fn from_normal(n: &Vector3f) -> Frame {
        let (s, t) = build_tangent_frame(n);
        Frame { s, t, n: *n }
    }

    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.s), v.dot(&self.t), v.dot(&self.n))
    }

    pub fn to_world(&self, v: &Vector3f) -> Vector3f {
        self.s * v.x + self.t * v.y + self.n * v.z
    }
}

pub fn build_tangent_frame(n: &Vector3f) -> (Vector3f, Vector3f) {
    let up = if n.z.abs() < 0.999 {
        Vector3f::new(0.0, 0.0, 1.0)
    } else {
        Vector3f::new(1.0, 0.0, 0.0)
    };
    let tangent = n.cross(&up).normalize();
    let bitangent = n.cross(&tangent).normalize();
    (tangent, bitangent)
}
