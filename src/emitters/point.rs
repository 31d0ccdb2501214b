// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::{Emitter, EmitterFlag};
use crate::core::interaction::{DirectionSample, SurfaceInteraction};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::Spectrum;

/// Isotropic point light. It can only be reached by explicit sampling.
pub struct PointEmitter<S: Spectrum> {
    id: String,
    position: Vector3f,
    intensity: S,
}

impl<S: Spectrum> PointEmitter<S> {
    pub fn new(position: Vector3f, intensity: S) -> Self {
        Self { id: generate_node_id("PointEmitter"), position, intensity }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

impl<S: Spectrum> ComputationNode for PointEmitter<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("PointEmitter[id={}, position={:?}, intensity={:?}]", self.id, self.position, self.intensity)
    }
}

impl<S: Spectrum> Emitter<S> for PointEmitter<S> {
    fn flags(&self) -> EmitterFlag {
        EmitterFlag::DELTA_POSITION
    }

    fn eval(&self, _si: &SurfaceInteraction<S>) -> S {
        S::zero()
    }

    fn sample_direction(&self, reference: &SurfaceInteraction<S>, _u: &Vector2f) -> (DirectionSample, S) {
        let mut d = self.position - reference.p();
        let dist_sqr = d.norm_squared();
        if dist_sqr <= 0.0 {
            return (DirectionSample::default(), S::zero());
        }
        let dist = dist_sqr.sqrt();
        d /= dist;

        let ds = DirectionSample { p: self.position, n: Vector3f::zeros(), d, dist, pdf: 1.0, delta: true };
        (ds, self.intensity / dist_sqr)
    }

    fn pdf_direction(&self, _reference: &SurfaceInteraction<S>, _ds: &DirectionSample) -> Float {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShapeIntersection;
    use crate::math::ray::Ray3f;

    #[test]
    fn test_inverse_square_falloff() {
        let emitter = PointEmitter::new(Vector3f::new(0.0, 0.0, 2.0), 8.0 as Float);
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), None, None);
        let hit = ShapeIntersection { t: 1.0, p: Vector3f::zeros(), n: Vector3f::new(0.0, 0.0, 1.0), uv: Vector2f::zeros() };
        let reference = SurfaceInteraction::from_hit(&hit, &ray, None, None);

        let (ds, value) = emitter.sample_direction(&reference, &Vector2f::new(0.1, 0.2));
        assert!(ds.delta);
        assert!((ds.dist - 2.0).abs() < 1e-6);
        assert!((value - 2.0).abs() < 1e-6);
        assert_eq!(emitter.pdf_direction(&reference, &ds), 0.0);
        assert!(emitter.flags().contains(EmitterFlag::DELTA));
    }
}
