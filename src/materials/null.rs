// Copyright @yucwang 2026

use crate::core::bsdf::{BSDFEvalResult, BSDFFlags, BSDFSampleRecord, BSDF};
use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::interaction::SurfaceInteraction;
use crate::math::constants::{Float, Vector2f, Vector3f};
use crate::math::spectrum::Spectrum;

use std::marker::PhantomData;

/// Index-matched boundary: rays continue straight through.
pub struct NullBSDF<S: Spectrum> {
    id: String,
    _spectrum: PhantomData<S>,
}

impl<S: Spectrum> NullBSDF<S> {
    pub fn new(id: Option<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| generate_node_id("NullBSDF")),
            _spectrum: PhantomData,
        }
    }
}

impl<S: Spectrum> ComputationNode for NullBSDF<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("NullBSDF [id={}]", self.id)
    }
}

impl<S: Spectrum> BSDF<S> for NullBSDF<S> {
    fn flags(&self) -> BSDFFlags {
        BSDFFlags::NULL
    }

    fn sample(&self, si: &SurfaceInteraction<S>, _u1: Float, _u2: &Vector2f) -> (BSDFSampleRecord, S) {
        (BSDFSampleRecord::new(-si.wi(), 1.0, 1.0, BSDFFlags::NULL), S::splat(1.0))
    }

    fn eval_pdf(&self, _si: &SurfaceInteraction<S>, _wo: &Vector3f) -> BSDFEvalResult<S> {
        BSDFEvalResult::default()
    }
}
