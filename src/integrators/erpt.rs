// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::core::sampler::PrimarySampler;
use crate::core::scene::Scene;
use crate::integrators::path::radiance;
use crate::math::bitmap::Bitmap;
use crate::math::constants::{Float, Int, Vector2f, EPSILON};
use crate::math::spectrum::{self, luminance, Color};
use crate::sensors::pinhole::PinholeCamera;

// Each pixel is sampled on a 2x2 subpixel grid.
const SUBPIXEL_GRID: usize = 2;
// Screen-space mutations move a path at most this many pixels per axis.
const IMAGE_PLANE_MUTATION_RADIUS: Float = 10.0;
// Longest unbroken run of deposits a chain may place into one pixel.
const MAX_RUN: u32 = 10;

// A complete light path, reduced to where it lands on the film and what it
// carries. The primary-sample coordinates that produced it live in the
// sampler, so mutating the sampler and re-tracing yields a neighbour path.
#[derive(Clone, Copy, Debug)]
pub struct PathSample {
    pub x: Int,
    pub y: Int,
    pub value: Color,
    pub direct_hit: bool,
}

fn tent_filter(u: Float) -> Float {
    let r = 2.0 * u;
    if r < 1.0 {
        r.sqrt() - 1.0
    } else {
        1.0 - (2.0 - r).sqrt()
    }
}

// Traces one complete path for pixel (x, y) and estimates its radiance.
//
// The first two sampler coordinates always encode a screen offset. With
// `image_plane_mutation` unset they are drawn and discarded, which keeps the
// coordinate layout identical between seed paths and mutated paths; with it
// set they move the path up to the mutation radius away from (x, y).
// Proposals that leave the film are returned as None.
pub fn generate_path(
    scene: &Scene,
    camera: &PinholeCamera,
    sampler: &mut PrimarySampler,
    rng: &mut LcgRng,
    x: Int,
    y: Int,
    image_plane_mutation: bool,
) -> Option<PathSample> {
    let width = camera.width() as Int;
    let height = camera.height() as Int;

    let s1 = sampler.next(rng);
    let s2 = sampler.next(rng);

    let (x, y) = if image_plane_mutation {
        let r = IMAGE_PLANE_MUTATION_RADIUS;
        (
            x + (r * 2.0 * s1 - r + 0.5) as Int,
            y + (r * 2.0 * s2 - r + 0.5) as Int,
        )
    } else {
        (x, y)
    };
    if x < 0 || width <= x || y < 0 || height <= y {
        return None;
    }

    let grid = SUBPIXEL_GRID as Float;
    let sx = ((sampler.next(rng) * grid) as usize).min(SUBPIXEL_GRID - 1);
    let sy = ((sampler.next(rng) * grid) as usize).min(SUBPIXEL_GRID - 1);

    // Tent filter pulls the sub-pixel offset towards the cell centre.
    let dx = tent_filter(sampler.next(rng));
    let dy = tent_filter(sampler.next(rng));

    let u = ((sx as Float + 0.5 + dx) / grid + x as Float) / width as Float;
    let v = ((sy as Float + 0.5 + dy) / grid + y as Float) / height as Float;
    let ray = camera.sample_ray(&Vector2f::new(u, v));

    let weight = grid * grid;
    let value = radiance(scene, &ray, 0, sampler, rng) * weight;
    // Rewind so the caller can replay or mutate the very same coordinates.
    sampler.reset();

    let direct_hit = luminance(&(value - *scene.light().emission() * weight)).abs() < EPSILON;
    Some(PathSample { x, y, value, direct_hit })
}

// A chain that parks on one pixel keeps stamping the same quantum there,
// which reads as spot noise. Capping the unbroken run length trades a small
// bias for a much cleaner image.
struct ConsecutiveFilter {
    x: Int,
    y: Int,
    run: u32,
}

impl ConsecutiveFilter {
    fn new(x: Int, y: Int) -> Self {
        Self { x, y, run: 0 }
    }

    fn permit(&mut self, x: Int, y: Int) -> bool {
        if self.x == x && self.y == y {
            self.run += 1;
        } else {
            self.x = x;
            self.y = y;
            self.run = 0;
        }
        self.run < MAX_RUN
    }
}

// Number of chains to spawn for a seed path. Randomised rounding keeps the
// expectation at lum / (mutations * ed) without a fractional chain.
fn chain_count(rng: &mut LcgRng, path_luminance: Float, mutations: u32, ed: Float) -> usize {
    (rng.next_float() + path_luminance / (mutations as Float * ed)).floor() as usize
}

pub struct ErptIntegrator {
    samples_per_pixel: u32,
    mutations_per_chain: u32,
}

impl ErptIntegrator {
    pub fn new(samples_per_pixel: u32, mutations_per_chain: u32) -> Self {
        Self { samples_per_pixel, mutations_per_chain }
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn mutations_per_chain(&self) -> u32 {
        self.mutations_per_chain
    }

    // Average path luminance over one sweep of the film, divided by the
    // mutation count. This is the quantum of energy a single chain step
    // deposits, the ed of the redistribution papers.
    pub fn deposition_energy(
        &self,
        scene: &Scene,
        camera: &PinholeCamera,
        rng: &mut LcgRng,
    ) -> Float {
        let mut total = spectrum::black();
        for y in 0..camera.height() as Int {
            for x in 0..camera.width() as Int {
                let mut sampler = PrimarySampler::new(rng);
                if let Some(sample) = generate_path(scene, camera, &mut sampler, rng, x, y, false)
                {
                    total += sample.value;
                }
            }
        }
        let pixels = (camera.width() * camera.height()) as Float;
        luminance(&(total / pixels)) / self.mutations_per_chain as Float
    }

    // Seeds `samples_per_pixel` paths at (x, y) and redistributes their
    // energy through Markov chains. Deposits may land anywhere on `film`,
    // not just at the seeded pixel.
    pub fn render_pixel(
        &self,
        scene: &Scene,
        camera: &PinholeCamera,
        x: Int,
        y: Int,
        deposition_energy: Float,
        film: &mut Bitmap,
        rng: &mut LcgRng,
    ) {
        let spp = self.samples_per_pixel as Float;
        for _ in 0..self.samples_per_pixel {
            let mut seed_sampler = PrimarySampler::new(rng);
            let seed = match generate_path(scene, camera, &mut seed_sampler, rng, x, y, false) {
                Some(sample) => sample,
                None => continue,
            };

            // A path that sees the lamp first-hand carries its entire
            // emission. Redistributing that would swamp the neighbourhood,
            // so it goes straight to the film instead.
            if seed.direct_hit {
                film[(seed.x as usize, seed.y as usize)] += seed.value / spp;
                continue;
            }

            let seed_luminance = luminance(&seed.value);
            if seed_luminance <= 0.0 || deposition_energy <= 0.0 {
                continue;
            }

            let chains =
                chain_count(rng, seed_luminance, self.mutations_per_chain, deposition_energy);
            // Every deposit along every chain of this seed stamps the same
            // quantum, tinted by the seed path's colour.
            let quantum = seed.value * (deposition_energy / seed_luminance / spp);

            for _ in 0..chains {
                self.run_chain(scene, camera, x, y, &seed_sampler, &seed, quantum, film, rng);
            }
        }
    }

    fn run_chain(
        &self,
        scene: &Scene,
        camera: &PinholeCamera,
        seed_x: Int,
        seed_y: Int,
        seed_sampler: &PrimarySampler,
        seed_path: &PathSample,
        quantum: Color,
        film: &mut Bitmap,
        rng: &mut LcgRng,
    ) {
        let mut current_sampler = seed_sampler.clone();
        let mut current_path = *seed_path;
        let mut filter = ConsecutiveFilter::new(seed_x, seed_y);

        for _ in 0..self.mutations_per_chain {
            let mut proposal_sampler = current_sampler.clone();
            proposal_sampler.mutate(rng);
            // Screen mutations are always relative to the seeded pixel; the
            // chain's position lives in the first two coordinates.
            let proposal =
                generate_path(scene, camera, &mut proposal_sampler, rng, seed_x, seed_y, true);

            // Off-film proposals are rejected outright. The current path
            // always has positive luminance (a zero-luminance proposal is
            // never accepted), so the ratio is well defined.
            if let Some(proposal_path) = proposal {
                let ratio =
                    luminance(&proposal_path.value) / luminance(&current_path.value);
                if ratio > rng.next_float() {
                    current_sampler = proposal_sampler;
                    current_path = proposal_path;
                }
            }

            if filter.permit(current_path.x, current_path.y) {
                film[(current_path.x as usize, current_path.y as usize)] += quantum;
            }
        }
    }
}
