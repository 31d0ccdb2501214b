// Copyright @yucwang 2026

use crate::core::computation_node::{ComputationNode, generate_node_id};
use crate::core::emitter::{Emitter, EmitterFlag};
use crate::core::interaction::{DirectionSample, SurfaceInteraction};
use crate::math::constants::{Float, Vector2f};
use crate::math::spectrum::Spectrum;
use crate::math::warp::{sample_uniform_sphere, sample_uniform_sphere_pdf};

/// Environment of constant radiance surrounding the scene.
pub struct ConstantEmitter<S: Spectrum> {
    id: String,
    radiance: S,
}

impl<S: Spectrum> ConstantEmitter<S> {
    pub fn new(radiance: S) -> Self {
        Self { id: generate_node_id("ConstantEmitter"), radiance }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

impl<S: Spectrum> ComputationNode for ConstantEmitter<S> {
    fn id(&self) -> &str {
        &self.id
    }

    fn to_string(&self) -> String {
        format!("ConstantEmitter[id={}, radiance={:?}]", self.id, self.radiance)
    }
}

impl<S: Spectrum> Emitter<S> for ConstantEmitter<S> {
    fn flags(&self) -> EmitterFlag {
        EmitterFlag::INFINITE
    }

    fn eval(&self, _si: &SurfaceInteraction<S>) -> S {
        self.radiance
    }

    fn sample_direction(&self, reference: &SurfaceInteraction<S>, u: &Vector2f) -> (DirectionSample, S) {
        let d = sample_uniform_sphere(u);
        let pdf = sample_uniform_sphere_pdf();
        let ds = DirectionSample {
            p: reference.p() + d,
            n: -d,
            d,
            dist: Float::INFINITY,
            pdf,
            delta: false,
        };
        (ds, self.radiance / pdf)
    }

    fn pdf_direction(&self, _reference: &SurfaceInteraction<S>, _ds: &DirectionSample) -> Float {
        sample_uniform_sphere_pdf()
    }
}
