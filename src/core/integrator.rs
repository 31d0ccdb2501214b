// Copyright @yucwang 2026

use crate::core::batch::Mask;
use crate::core::computation_node::ComputationNode;
use crate::core::sampler::Sampler;
use crate::core::scene::Scene;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;

/// Per-lane result of one integrator invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorOutput<S: Spectrum> {
    pub radiance: Vec<S>,
    pub valid: Mask,
    /// One buffer per entry of `aov_names()`, each `radiance.len()` long.
    pub aovs: Vec<Vec<Float>>,
}

impl<S: Spectrum> IntegratorOutput<S> {
    pub fn len(&self) -> usize {
        self.radiance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radiance.is_empty()
    }
}

/// Integrator that estimates radiance for a wavefront of sensor rays.
pub trait SamplingIntegrator<S: Spectrum>: ComputationNode + Send + Sync {
    fn sample(&self,
              scene: &Scene<S>,
              sampler: &mut dyn Sampler,
              rays: &[Ray3f],
              active: &Mask) -> IntegratorOutput<S>;

    fn aov_names(&self) -> Vec<String>;
}
