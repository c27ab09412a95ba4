// Copyright @yucwang 2026

use crate::math::constants::Float;

// Deterministic 64-bit LCG. Every worker owns one, seeded from its work unit,
// which is what makes renders replayable seed-for-seed.
pub struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    // Uniform in [0, 1). The divisor is 2^32 rather than u32::MAX so 1.0 is
    // never produced; the primary sampler relies on that.
    pub fn next_float(&mut self) -> Float {
        (self.next_u32() as Float) / 4294967296.0
    }
}
