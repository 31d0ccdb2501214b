// Copyright @yucwang 2026

use crate::core::batch::{select, Mask};
use crate::core::integrator::IntegratorOutput;
use crate::core::interaction::SurfaceInteraction;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::Spectrum;

/// Structure-of-arrays state of a wavefront of paths. Lane `i` of every
/// field belongs to the path started by the `i`-th sensor ray.
#[derive(Debug, Clone)]
pub struct PathBatch<S: Spectrum> {
    pub rays: Vec<Ray3f>,
    pub throughput: Vec<S>,
    pub radiance: Vec<S>,
    pub eta: Vec<Float>,
    pub depth: Vec<u32>,
    pub active: Mask,
    pub prev_si: Vec<Option<SurfaceInteraction<S>>>,
    pub prev_bsdf_pdf: Vec<Float>,
    pub prev_bsdf_delta: Vec<bool>,
    pub valid_ray: Mask,
    /// Distance to the most recent valid hit, 0 until there is one.
    pub last_t: Vec<Float>,
}

impl<S: Spectrum> PathBatch<S> {
    /// Fresh paths for `rays`. Lanes outside `active` start (and stay) dead
    /// and never count as valid.
    pub fn new(rays: &[Ray3f], active: &Mask, valid_ray: bool) -> Self {
        let width = rays.len();
        debug_assert_eq!(width, active.len());
        Self {
            rays: rays.to_vec(),
            throughput: vec![S::splat(1.0); width],
            radiance: vec![S::zero(); width],
            eta: vec![1.0; width],
            depth: vec![0; width],
            active: active.clone(),
            prev_si: vec![None; width],
            prev_bsdf_pdf: vec![1.0; width],
            prev_bsdf_delta: vec![true; width],
            valid_ray: Mask::from_fn(width, |i| valid_ray && active[i]),
            last_t: vec![0.0; width],
        }
    }

    pub fn len(&self) -> usize {
        self.rays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rays.is_empty()
    }

    /// Packs the final state. With `hide_emitters` the radiance of lanes
    /// that never became valid is reported as zero; otherwise radiance is
    /// passed through untouched.
    pub fn into_output(self, hide_emitters: bool) -> IntegratorOutput<S> {
        let radiance = self.radiance.iter()
            .zip(self.valid_ray.iter())
            .map(|(l, valid)| select(valid || !hide_emitters, *l, S::zero()))
            .collect();
        IntegratorOutput {
            radiance,
            valid: self.valid_ray,
            aovs: vec![self.last_t],
        }
    }
}
