// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::math::constants::Float;

// One full light path consumes one contiguous run of these coordinates, so
// perturbing the stored vector perturbs the whole path at once.
const MUTATE_DISTANCE: Float = 0.05;
const INITIAL_DIMENSIONS: usize = 32;

// Primary-sample-space coordinate stream. The sampler is a plain value: the
// uncorrelated source stays outside and is passed in, so forking a Markov
// chain is a clone() and the two copies diverge independently afterwards.
#[derive(Clone, Debug)]
pub struct PrimarySampler {
    coords: Vec<Float>,
    cursor: usize,
}

impl PrimarySampler {
    pub fn new(rng: &mut LcgRng) -> Self {
        let mut coords = Vec::with_capacity(INITIAL_DIMENSIONS);
        for _ in 0..INITIAL_DIMENSIONS {
            coords.push(rng.next_float());
        }
        Self { coords, cursor: 0 }
    }

    // Replay a recorded coordinate vector, e.g. to re-trace a single path.
    pub fn from_coords(coords: Vec<Float>) -> Self {
        Self { coords, cursor: 0 }
    }

    // Next canonical coordinate in [0, 1). Grows the stored sequence by x1.5
    // with fresh draws when the cursor runs past the end; existing
    // coordinates are never discarded, so a reset() replays them exactly.
    pub fn next(&mut self, rng: &mut LcgRng) -> Float {
        if self.cursor >= self.coords.len() {
            let new_len = self.coords.len() * 3 / 2;
            while self.coords.len() < new_len {
                self.coords.push(rng.next_float());
            }
        }
        let value = self.coords[self.cursor];
        self.cursor += 1;
        value
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn dimensions(&self) -> usize {
        self.coords.len()
    }

    // Small-step Metropolis proposal: every stored coordinate moves by a
    // symmetric offset and wraps back into [0, 1). Symmetry is what lets the
    // acceptance rule skip the Hastings correction.
    pub fn mutate(&mut self, rng: &mut LcgRng) {
        for coord in self.coords.iter_mut() {
            *coord = mutate_coord(*coord, rng);
        }
    }
}

fn mutate_coord(value: Float, rng: &mut LcgRng) -> Float {
    let mut value = value + MUTATE_DISTANCE * (2.0 * rng.next_float() - 1.0);
    // >= keeps the result strictly below 1.0 even when the sum lands on it.
    if value >= 1.0 {
        value -= 1.0;
    }
    if value < 0.0 {
        value += 1.0;
    }
    value
}
