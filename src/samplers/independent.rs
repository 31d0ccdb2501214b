// Copyright @yucwang 2026

use crate::core::batch::Mask;
use crate::core::rng::LcgRng;
use crate::core::sampler::Sampler;
use crate::math::constants::{Float, Vector2f};

/// Uncorrelated uniform samples, one generator stream per lane.
#[derive(Debug, Clone)]
pub struct IndependentSampler {
    sample_count: u32,
    base_seed: u64,
    lanes: Vec<LcgRng>,
}

impl IndependentSampler {
    pub fn new(sample_count: u32, base_seed: u64) -> Self {
        Self { sample_count: sample_count.max(1), base_seed, lanes: Vec::new() }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }
}

impl Sampler for IndependentSampler {
    fn wavefront_size(&self) -> usize {
        self.lanes.len()
    }

    fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn seed(&mut self, seed: u64, wavefront_size: usize) {
        let family = self.base_seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(seed);
        self.lanes = (0..wavefront_size)
            .map(|lane| LcgRng::with_stream(family, lane as u64))
            .collect();
    }

    fn next_1d(&mut self, active: &Mask) -> Vec<Float> {
        debug_assert_eq!(active.len(), self.lanes.len());
        self.lanes.iter_mut()
            .zip(active.iter())
            .map(|(rng, a)| if a { rng.next_f32() } else { 0.0 })
            .collect()
    }

    fn next_2d(&mut self, active: &Mask) -> Vec<Vector2f> {
        debug_assert_eq!(active.len(), self.lanes.len());
        self.lanes.iter_mut()
            .zip(active.iter())
            .map(|(rng, a)| {
                if a {
                    let x = rng.next_f32();
                    let y = rng.next_f32();
                    Vector2f::new(x, y)
                } else {
                    Vector2f::zeros()
                }
            })
            .collect()
    }

    fn fork(&self) -> Box<dyn Sampler> {
        Box::new(IndependentSampler::new(self.sample_count, self.base_seed))
    }
}
