// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, BSDFFlags, BSDFSampleRecord, BSDF};
use crate::core::computation_node::{generate_node_id, ComputationNode};
use crate::core::interaction::SurfaceInteraction;
use crate::materials::fresnel::{fresnel_dielectric, reflect, refract};
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::Spectrum;

/// Smooth glass-like interface. One lobe is picked in proportion to the
/// Fresnel reflectance, so either event carries unit weight apart from the
/// tint and the radiance scaling on refraction.
pub struct SmoothDielectricBSDF<S: Spectrum> {
    id: String,
    eta: Float,
    specular_reflectance: S,
    specular_transmittance: S,
}

impl<S: Spectrum> SmoothDielectricBSDF<S> {
    pub fn new(int_ior: Float, ext_ior: Float) -> Self {
        Self {
            id: generate_node_id("SmoothDielectricBSDF"),
            eta: int_ior / ext_ior,
            specular_reflectance: S::splat(1.0),
            specular_transmittance: S::splat(1.0),
        }
    }

    pub fn with_tint(mut self, specular_reflectance: S, specular_transmittance: S) -> Self {
        self.specular_reflectance = specular_reflectance;
        self.specular_transmittance = specular_transmittance;
        self
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }

    pub fn eta(&self) -> Float {
        self.eta
    }
}

impl<S: Spectrum> ComputationNode for SmoothDielectricBSDF<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("SmoothDielectricBSDF[id={}, eta={}]", self.id, self.eta)
    }
}

impl<S: Spectrum> BSDF<S> for SmoothDielectricBSDF<S> {
    fn flags(&self) -> BSDFFlags {
        BSDFFlags::DELTA_REFLECTION | BSDFFlags::DELTA_TRANSMISSION
    }

    fn sample(&self, si: &SurfaceInteraction<S>, u1: Float, _u2: &Vector2f) -> (BSDFSampleRecord, S) {
        let wi = si.wi();
        let (r, cos_theta_t, eta_it, eta_ti) = fresnel_dielectric(wi.z, self.eta);
        let t = 1.0 - r;

        if u1 <= r {
            let record = BSDFSampleRecord::new(reflect(&wi), r, 1.0, BSDFFlags::DELTA_REFLECTION);
            (record, self.specular_reflectance)
        } else {
            let record = BSDFSampleRecord::new(refract(&wi, cos_theta_t, eta_ti), t, eta_it,
                                               BSDFFlags::DELTA_TRANSMISSION);
            // Radiance is compressed into the denser medium.
            (record, self.specular_transmittance * (eta_ti * eta_ti))
        }
    }

    fn eval_pdf(&self, _si: &SurfaceInteraction<S>, _wo: &Vector3f) -> BSDFEvalResult<S> {
        BSDFEvalResult::default()
    }
}
