// Copyright @yucwang 2026

use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::emitter::{Emitter, EmitterFlag};
use crate::core::interaction::{DirectionSample, SurfaceInteraction};
use crate::core::shape::Shape;
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::Spectrum;
use std::sync::Arc;

/// Uniform radiance leaving the front face of a shape.
pub struct AreaEmitter<S: Spectrum> {
    id: String,
    shape: Arc<dyn Shape>,
    radiance: S,
}

impl<S: Spectrum> AreaEmitter<S> {
    pub fn new(shape: Arc<dyn Shape>, radiance: S) -> Self {
        Self { id: generate_node_id("AreaEmitter"), shape, radiance }
    }

    pub fn radiance(&self) -> S {
        self.radiance
    }
}

impl<S: Spectrum> ComputationNode for AreaEmitter<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("AreaEmitter[id={}, radiance={:?}, shape={}]", self.id, self.radiance, self.shape.id())
    }
}

impl<S: Spectrum> Emitter<S> for AreaEmitter<S> {
    fn flags(&self) -> EmitterFlag {
        EmitterFlag::SURFACE
    }

    fn eval(&self, si: &SurfaceInteraction<S>) -> S {
        if si.is_valid() && si.wi().z > 0.0 {
            self.radiance
        } else {
            S::zero()
        }
    }

    fn sample_direction(&self, reference: &SurfaceInteraction<S>, u: &Vector2f) -> (DirectionSample, S) {
        let ps = self.shape.sample_position(u);
        let mut d = ps.p - reference.p();
        let dist_sqr = d.norm_squared();
        let dist = dist_sqr.sqrt();
        if dist <= 0.0 || ps.pdf <= 0.0 {
            return (DirectionSample::default(), S::zero());
        }
        d /= dist;

        let cos_light = -ps.n.dot(&d);
        if cos_light <= 0.0 {
            return (DirectionSample::default(), S::zero());
        }

        let pdf = ps.pdf * dist_sqr / cos_light;
        let ds = DirectionSample { p: ps.p, n: ps.n, d, dist, pdf, delta: false };
        (ds, self.radiance / pdf)
    }

    fn pdf_direction(&self, _reference: &SurfaceInteraction<S>, ds: &DirectionSample) -> Float {
        let cos_light = -ds.n.dot(&ds.d);
        if cos_light <= 0.0 || !ds.dist.is_finite() {
            return 0.0;
        }
        self.shape.pdf_position(&ds.p) * ds.dist * ds.dist / cos_light
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShapeIntersection;
    use crate::math::constants::Vector3f;
    use crate::math::ray::Ray3f;
    use crate::math::transform::Transform;
    use crate::shapes::rectangle::Rectangle;

    fn ceiling_light() -> AreaEmitter<Float> {
        let to_world = Transform::translate(&Vector3f::new(0.0, 0.0, 1.0))
            * Transform::scale(&Vector3f::new(1.0, -1.0, 1.0));
        AreaEmitter::new(Arc::new(Rectangle::new(to_world)), 2.0)
    }

    fn floor_point() -> SurfaceInteraction<Float> {
        let ray = Ray3f::new(Vector3f::new(0.0, -1.0, 1.0), Vector3f::new(0.0, 1.0, -1.0), None, None);
        let hit = ShapeIntersection { t: 1.0, p: Vector3f::zeros(), n: Vector3f::new(0.0, 0.0, 1.0), uv: Vector2f::zeros() };
        SurfaceInteraction::from_hit(&hit, &ray, None, None)
    }

    #[test]
    fn test_sample_and_pdf_agree() {
        let emitter = ceiling_light();
        let reference = floor_point();
        let (ds, value) = emitter.sample_direction(&reference, &Vector2f::new(0.5, 0.5));
        assert!((ds.dist - 1.0).abs() < 1e-5);
        assert!((ds.pdf - 0.25).abs() < 1e-5);
        assert!((value - 8.0).abs() < 1e-4);
        assert!((emitter.pdf_direction(&reference, &ds) - ds.pdf).abs() < 1e-5);
    }

    #[test]
    fn test_back_face_is_dark() {
        let emitter = ceiling_light();
        let from_below = Ray3f::new(Vector3f::zeros(), Vector3f::new(0.0, 0.0, 1.0), None, None);
        let hit = ShapeIntersection { t: 1.0, p: Vector3f::new(0.0, 0.0, 1.0), n: Vector3f::new(0.0, 0.0, -1.0), uv: Vector2f::zeros() };
        let front = SurfaceInteraction::from_hit(&hit, &from_below, None, None);
        assert_eq!(emitter.eval(&front), 2.0);

        let from_above = Ray3f::new(Vector3f::new(0.0, 0.0, 2.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let back = SurfaceInteraction::from_hit(&hit, &from_above, None, None);
        assert_eq!(emitter.eval(&back), 0.0);
    }
}
