// Copyright @yucwang 2026

use crate::core::batch::Mask;
use crate::math::constants::{Float, Vector2f};

/// Per-lane stream of uniform samples for a wavefront.
///
/// Lanes that are masked off receive zero and their streams do not advance,
/// so a lane's sequence never depends on what its neighbours are doing.
pub trait Sampler: Send + Sync {
    fn wavefront_size(&self) -> usize;

    fn sample_count(&self) -> u32;

    /// Reset all lanes for a new wavefront of `wavefront_size` lanes.
    fn seed(&mut self, seed: u64, wavefront_size: usize);

    fn next_1d(&mut self, active: &Mask) -> Vec<Float>;

    fn next_2d(&mut self, active: &Mask) -> Vec<Vector2f>;

    /// Fresh sampler with the same configuration, unseeded.
    fn fork(&self) -> Box<dyn Sampler>;
}
