// Copyright @yucwang 2026

use crate::math::constants::Float;

/// Upper bound on the survival probability so every path can terminate.
pub const MAX_SURVIVAL_PROBABILITY: Float = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RouletteOutcome {
    /// The path survives; its throughput is multiplied by `compensation`.
    Continue { compensation: Float },
    Terminate,
}

/// Russian roulette starting once a path has scattered `rr_depth` times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RussianRoulette {
    rr_depth: u32,
}

impl RussianRoulette {
    pub fn new(rr_depth: u32) -> Self {
        Self { rr_depth }
    }

    pub fn applies(&self, depth: u32) -> bool {
        depth >= self.rr_depth
    }

    /// `min(throughput_max * eta^2, 0.95)`; non-finite inputs never survive.
    pub fn survival_probability(throughput_max: Float, eta: Float) -> Float {
        let q = throughput_max * eta * eta;
        if q.is_finite() && q > 0.0 {
            q.min(MAX_SURVIVAL_PROBABILITY)
        } else {
            0.0
        }
    }

    pub fn decide(survival_probability: Float, u: Float) -> RouletteOutcome {
        if survival_probability > 0.0 && u < survival_probability {
            RouletteOutcome::Continue { compensation: 1.0 / survival_probability }
        } else {
            RouletteOutcome::Terminate
        }
    }
}
