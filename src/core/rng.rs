// Copyright @yucwang 2026

use crate::math::constants::Float;

#[derive(Debug, Clone)]
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Seed one stream of a family. Neighbouring (seed, stream) pairs land
    /// far apart in the LCG sequence.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self { state: splitmix64(seed ^ splitmix64(stream.wrapping_add(0x9E37_79B9_7F4A_7C15))) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.state >> 32) as u32
    }

    // Uniform in [0, 1).
    pub fn next_f32(&mut self) -> Float {
        ((self.next_u32() >> 8) as Float) * (1.0 / (1u32 << 24) as Float)
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
