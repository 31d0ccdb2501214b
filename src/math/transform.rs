// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Matrix4f, Vector3f, Vector4f };
use super::ray::Ray3f;

use nalgebra::{ Rotation3, Unit };
use std::ops;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4f,
    inv_matrix: Matrix4f
}

impl Default for Transform {
    fn default() -> Self {
        Self { matrix: Matrix4f::identity(),
               inv_matrix: Matrix4f::identity() }
    }
}

impl ops::Mul for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform { matrix: self.matrix * rhs.matrix,
                    inv_matrix: rhs.inv_matrix * self.inv_matrix }
    }
}

impl Transform {
    pub fn new(matrix: Matrix4f) -> Self {
        Self { matrix: matrix,
               inv_matrix: matrix.try_inverse().unwrap_or(Matrix4f::identity())}
    }

    pub fn translate(v: &Vector3f) -> Self {
        Self::new(Matrix4f::new_translation(v))
    }

    pub fn scale(v: &Vector3f) -> Self {
        Self::new(Matrix4f::new_nonuniform_scaling(v))
    }

    pub fn rotate(axis: &Vector3f, angle_deg: Float) -> Self {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_deg.to_radians());
        Self::new(rotation.to_homogeneous())
    }

    pub fn apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.matrix * Vector4f::new(p.x, p.y, p.z, 1.0);
        Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    pub fn apply_vector(&self, v: Vector3f) -> Vector3f {
        self.matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    // Normal transformation is different from point transformation.
    // Before transformation, we have n^Tx = 0
    // After transformation, we have (Sn)^T(Mx) = 0
    // Then, we will get: S = (M^{-1})^T
    pub fn apply_normal(&self, n: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0).transpose() * n
    }

    pub fn inv_apply_point(&self, p: Vector3f) -> Vector3f {
        let h = self.inv_matrix * Vector4f::new(p.x, p.y, p.z, 1.0);
        Vector3f::new(h.x / h.w, h.y / h.w, h.z / h.w)
    }

    pub fn inv_apply_vector(&self, v: Vector3f) -> Vector3f {
        self.inv_matrix.fixed_slice::<3, 3>(0, 0) * v
    }

    // The direction stays unnormalized so the ray parameter t is shared
    // between object and world space.
    pub fn inv_apply_ray_unnormalized(&self, ray: &Ray3f) -> (Vector3f, Vector3f) {
        (self.inv_apply_point(ray.origin()), self.inv_apply_vector(ray.dir()))
    }
}
