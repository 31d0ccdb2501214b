// Copyright @yucwang 2023

use crate::core::bsdf::{BSDFEvalResult, BSDFFlags, BSDFSampleRecord, BSDF};
use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::interaction::SurfaceInteraction;
use crate::math::constants::{ Float, INV_PI, Vector2f, Vector3f };
use crate::math::spectrum::Spectrum;
use crate::math::warp::{ sample_cosine_hemisphere, sample_cosine_hemisphere_pdf };

/// Two-sided Lambertian reflector.
pub struct LambertianDiffuseBSDF<S: Spectrum> {
    id: String,
    reflectance: S,
}

impl<S: Spectrum> LambertianDiffuseBSDF<S> {
    pub fn new(reflectance: S) -> Self {
        Self {
            id: generate_node_id("LambertianDiffuseBSDF"),
            reflectance,
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn reflectance(&self) -> S {
        self.reflectance
    }
}

impl<S: Spectrum> ComputationNode for LambertianDiffuseBSDF<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("LambertianDiffuseBSDF[id={}, reflectance={:?}]", self.id, self.reflectance)
    }
}

impl<S: Spectrum> BSDF<S> for LambertianDiffuseBSDF<S> {
    fn flags(&self) -> BSDFFlags {
        BSDFFlags::DIFFUSE_REFLECTION
    }

    fn sample(&self, si: &SurfaceInteraction<S>,
                     _u1: Float,
                     u2: &Vector2f) -> (BSDFSampleRecord, S) {
        let wi = si.wi();
        if wi.z == 0.0 {
            return (BSDFSampleRecord::default(), S::zero());
        }

        let mut wo = sample_cosine_hemisphere(u2);
        if wi.z < 0.0 {
            wo.z = -wo.z;
        }
        let pdf = sample_cosine_hemisphere_pdf(wo.z.abs());
        if pdf <= 0.0 {
            return (BSDFSampleRecord::default(), S::zero());
        }

        // f * cos / pdf collapses to the albedo for cosine sampling.
        (BSDFSampleRecord::new(wo, pdf, 1.0, BSDFFlags::DIFFUSE_REFLECTION), self.reflectance)
    }

    fn eval_pdf(&self, si: &SurfaceInteraction<S>, wo: &Vector3f) -> BSDFEvalResult<S> {
        let wi = si.wi();
        if wi.z * wo.z <= 0.0 {
            return BSDFEvalResult::default();
        }

        let cos_o = wo.z.abs();
        BSDFEvalResult {
            value: self.reflectance * (INV_PI * cos_o),
            pdf: sample_cosine_hemisphere_pdf(cos_o),
        }
    }
}
