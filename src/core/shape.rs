// Copyright @yucwang 2023

use crate::core::computation_node::ComputationNode;
use crate::core::interaction::{ PositionSample, ShapeIntersection };
use crate::math::constants::{ Float, Vector2f, Vector3f };
use crate::math::ray::Ray3f;

pub trait Shape: ComputationNode + Send + Sync {
    /// Closest hit inside `[ray.min_t, ray.max_t]`.
    fn ray_intersection(&self, ray: &Ray3f) -> Option<ShapeIntersection>;
    fn ray_intersection_t(&self, ray: &Ray3f) -> bool;
    /// Uniform point on the surface, density with respect to area.
    fn sample_position(&self, u: &Vector2f) -> PositionSample;
    fn pdf_position(&self, p: &Vector3f) -> Float;
    fn surface_area(&self) -> Float;
}
