// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, BSDFFlags, BSDFSampleRecord, BSDF};
use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::interaction::SurfaceInteraction;
use crate::materials::fresnel::reflect;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::Spectrum;

/// Perfectly smooth mirror tinted by `specular_reflectance`.
pub struct SmoothConductorBSDF<S: Spectrum> {
    id: String,
    specular_reflectance: S,
}

impl<S: Spectrum> SmoothConductorBSDF<S> {
    pub fn new(specular_reflectance: S) -> Self {
        Self { id: generate_node_id("SmoothConductorBSDF"), specular_reflectance }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

impl<S: Spectrum> ComputationNode for SmoothConductorBSDF<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("SmoothConductorBSDF[id={}, specular_reflectance={:?}]", self.id, self.specular_reflectance)
    }
}

impl<S: Spectrum> BSDF<S> for SmoothConductorBSDF<S> {
    fn flags(&self) -> BSDFFlags {
        BSDFFlags::DELTA_REFLECTION
    }

    fn sample(&self, si: &SurfaceInteraction<S>, _u1: Float, _u2: &Vector2f) -> (BSDFSampleRecord, S) {
        let wi = si.wi();
        if wi.z == 0.0 {
            return (BSDFSampleRecord::default(), S::zero());
        }
        (BSDFSampleRecord::new(reflect(&wi), 1.0, 1.0, BSDFFlags::DELTA_REFLECTION), self.specular_reflectance)
    }

    fn eval_pdf(&self, _si: &SurfaceInteraction<S>, _wo: &Vector3f) -> BSDFEvalResult<S> {
        BSDFEvalResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::interaction::ShapeIntersection;
    use crate::math::ray::Ray3f;
    use crate::math::spectrum::RGBSpectrum;

    #[test]
    fn test_mirror_direction_and_tint() {
        let bsdf = SmoothConductorBSDF::new(RGBSpectrum::new(0.9, 0.8, 0.7));
        let ray = Ray3f::new(Vector3f::new(1.0, 0.0, 1.0), Vector3f::new(-1.0, 0.0, -1.0), None, None);
        let hit = ShapeIntersection { t: 1.0, p: Vector3f::zeros(), n: Vector3f::new(0.0, 0.0, 1.0), uv: Vector2f::zeros() };
        let si = SurfaceInteraction::from_hit(&hit, &ray, None, None);

        let (bs, weight) = bsdf.sample(&si, 0.5, &Vector2f::new(0.5, 0.5));
        let wo_world = si.to_world(&bs.wo);
        let expected = Vector3f::new(-1.0, 0.0, 1.0).normalize();
        assert!((wo_world - expected).norm() < 1e-5);
        assert_eq!(weight, RGBSpectrum::new(0.9, 0.8, 0.7));
        assert!(bs.sampled_type.contains(BSDFFlags::DELTA));
        assert!(bsdf.eval_pdf(&si, &bs.wo).value.is_black());
    }
}
